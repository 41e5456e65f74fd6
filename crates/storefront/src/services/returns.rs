//! Return (RMA) requests.

use tracing::instrument;

use paintshop_core::OrderId;

use crate::backend::{MockBackend, ReturnConfirmation};
use crate::error::AppError;
use crate::validation::ReturnForm;

/// Validate and file a return against one of the visitor's own orders.
///
/// # Errors
///
/// Returns `AppError::Validation` for an invalid form, `AppError::NotFound`
/// when the order was not placed in this session, and `AppError::Backend`
/// when the backend rejects or fails the request.
#[instrument(skip_all, fields(order_id = form.order_id.as_deref().unwrap_or_default()))]
pub async fn request_return(
    backend: &MockBackend,
    own_orders: &[OrderId],
    form: ReturnForm,
) -> Result<ReturnConfirmation, AppError> {
    let request = form.validate()?;

    if !own_orders.contains(&request.order_id) {
        return Err(AppError::NotFound(format!("order {}", request.order_id)));
    }

    Ok(backend.submit_return_request(request).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::MockBackendConfig;
    use crate::catalog::Catalog;
    use crate::validation::ReturnLineForm;

    fn form(order_id: &str, reason: &str, comments: Option<&str>) -> ReturnForm {
        ReturnForm {
            order_id: Some(order_id.to_string()),
            items: vec![ReturnLineForm {
                product_id: "bond-primer".to_string(),
                color_id: "white".to_string(),
                finish_id: "flat".to_string(),
                quantity: 1,
            }],
            reason: Some(reason.to_string()),
            comments: comments.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_foreign_order_is_not_found() {
        let backend = MockBackend::new(Catalog::reference(), MockBackendConfig::instant());
        let err = request_return(&backend, &[], form("PS-12345678", "damaged", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_form_reported_before_ownership() {
        let backend = MockBackend::new(Catalog::reference(), MockBackendConfig::instant());
        let err = request_return(&backend, &[], form("PS-12345678", "color_mismatch", None))
            .await
            .unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.message_for("comments").is_some());
    }
}
