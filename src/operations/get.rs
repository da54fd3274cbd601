//! Get operation: retrieve one entry from a region.

use super::{require_key, require_region, HandlerFuture, OperationHandler};
use crate::connection::context::MessageExecutionContext;
use crate::core::error::ProtocolError;
use crate::protocol::message::{GetRequest, GetResponse};
use crate::protocol::value::Value;

/// Handler for [`GetRequest`].
pub struct GetHandler;

impl OperationHandler for GetHandler {
    type Request = GetRequest;
    type Response = GetResponse;

    fn process<'a>(
        &'a self,
        request: Self::Request,
        context: &'a mut MessageExecutionContext,
    ) -> HandlerFuture<'a, Self::Response> {
        Box::pin(async move {
            require_region(&request.region)?;
            let key = Value::from(request.key);
            require_key(&key)?;

            if !context.cache().region_exists(&request.region).await {
                return Err(ProtocolError::RegionNotFound {
                    region: request.region,
                }
                .into());
            }

            match context.cache().get(&request.region, &key).await {
                Some(value) => Ok(GetResponse {
                    value: value.into(),
                }),
                None => Err(ProtocolError::NotFound.into()),
            }
        })
    }
}
