//! Remove operation: delete one entry from a region.

use super::{require_key, require_region, HandlerFuture, OperationHandler};
use crate::connection::context::MessageExecutionContext;
use crate::core::error::ProtocolError;
use crate::protocol::message::{RemoveRequest, RemoveResponse};
use crate::protocol::value::Value;

/// Handler for [`RemoveRequest`].
///
/// Removing an absent key succeeds with `removed = false`; only a missing
/// region is an error.
pub struct RemoveHandler;

impl OperationHandler for RemoveHandler {
    type Request = RemoveRequest;
    type Response = RemoveResponse;

    fn process<'a>(
        &'a self,
        request: Self::Request,
        context: &'a mut MessageExecutionContext,
    ) -> HandlerFuture<'a, Self::Response> {
        Box::pin(async move {
            require_region(&request.region)?;
            let key = Value::from(request.key);
            require_key(&key)?;

            match context.cache().remove(&request.region, &key).await {
                Some(removed) => Ok(RemoveResponse { removed }),
                None => Err(ProtocolError::RegionNotFound {
                    region: request.region,
                }
                .into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorCode;
    use crate::operations::testing;
    use crate::protocol::value::EncodedValue;

    #[tokio::test]
    async fn test_remove_deletes_entry() {
        let mut context = testing::context().await;
        let response = RemoveHandler
            .process(
                RemoveRequest {
                    region: "inventory".to_string(),
                    key: EncodedValue::String("widget".to_string()),
                },
                &mut context,
            )
            .await
            .unwrap();
        assert!(response.removed);

        let remaining = context
            .cache()
            .get("inventory", &Value::String("widget".to_string()))
            .await;
        assert_eq!(remaining, None);
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_idempotent() {
        let mut context = testing::context().await;
        let response = RemoveHandler
            .process(
                RemoveRequest {
                    region: "inventory".to_string(),
                    key: EncodedValue::String("gadget".to_string()),
                },
                &mut context,
            )
            .await
            .unwrap();
        assert!(!response.removed);
    }

    #[tokio::test]
    async fn test_remove_missing_region_fails() {
        let mut context = testing::context().await;
        let error = RemoveHandler
            .process(
                RemoveRequest {
                    region: "orders".to_string(),
                    key: EncodedValue::String("widget".to_string()),
                },
                &mut context,
            )
            .await
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::RegionNotFound);
    }
}
