//! Put operation: store one entry in a region.

use super::{require_key, require_region, HandlerFuture, OperationHandler};
use crate::connection::context::MessageExecutionContext;
use crate::core::error::ProtocolError;
use crate::protocol::message::{PutRequest, PutResponse};
use crate::protocol::value::Value;

/// Handler for [`PutRequest`].
pub struct PutHandler;

impl OperationHandler for PutHandler {
    type Request = PutRequest;
    type Response = PutResponse;

    fn process<'a>(
        &'a self,
        request: Self::Request,
        context: &'a mut MessageExecutionContext,
    ) -> HandlerFuture<'a, Self::Response> {
        Box::pin(async move {
            require_region(&request.region)?;
            let key = Value::from(request.key);
            require_key(&key)?;
            let value = Value::from(request.value);

            if !context.cache().put(&request.region, key, value).await {
                return Err(ProtocolError::RegionNotFound {
                    region: request.region,
                }
                .into());
            }
            Ok(PutResponse)
        })
    }
}
