use serde::{Deserialize, Serialize};

use crate::{domain::ProductId, error::ProtocolError};

/// Body of `POST /carrito/agregar/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub needs_cutlery: bool,
}

/// Union of every JSON body the cart endpoints answer with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_total_items: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_total: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub redirected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartAck {
    pub cart_total_items: Option<u32>,
    pub cart_total: Option<String>,
}

impl CartAck {
    pub fn require_total_items(&self) -> Result<u32, ProtocolError> {
        self.cart_total_items
            .ok_or(ProtocolError::MissingField("cart_total_items"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartReply {
    Accepted(CartAck),
    Unauthenticated,
    Rejected { reason: Option<String> },
}

pub fn is_auth_redirect_status(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308 | 401)
}

/// Sorts a raw endpoint answer into one of the three outcome classes.
///
/// A positive acknowledgement wins over everything else. Redirect statuses usually arrive with an
/// empty or HTML body, so they are recognised before the body is required to be JSON.
pub fn classify_cart_reply(status: u16, body: &[u8]) -> Result<CartReply, ProtocolError> {
    let decoded = serde_json::from_slice::<CartResponse>(body);

    if let Ok(response) = &decoded {
        if response.success {
            return Ok(CartReply::Accepted(CartAck {
                cart_total_items: response.cart_total_items,
                cart_total: response.cart_total.clone(),
            }));
        }
    }

    let flagged_redirect = decoded.as_ref().map(|r| r.redirected).unwrap_or(false);
    if is_auth_redirect_status(status) || flagged_redirect {
        return Ok(CartReply::Unauthenticated);
    }

    let response = decoded?;
    Ok(CartReply::Rejected {
        reason: response.error.filter(|reason| !reason.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_native_types() {
        let request = AddToCartRequest {
            product_id: ProductId::parse("17").expect("id"),
            quantity: 3,
            needs_cutlery: true,
        };
        let value = serde_json::to_value(&request).expect("json");
        assert_eq!(
            value,
            serde_json::json!({"product_id": "17", "quantity": 3, "needs_cutlery": true})
        );
    }

    #[test]
    fn success_body_is_accepted() {
        let reply = classify_cart_reply(
            200,
            br#"{"success":true,"cart_total_items":7,"cart_total":"42000.00"}"#,
        )
        .expect("reply");
        assert_eq!(
            reply,
            CartReply::Accepted(CartAck {
                cart_total_items: Some(7),
                cart_total: Some("42000.00".to_string()),
            })
        );
    }

    #[test]
    fn redirect_status_without_body_is_unauthenticated() {
        let reply = classify_cart_reply(302, b"").expect("reply");
        assert_eq!(reply, CartReply::Unauthenticated);
    }

    #[test]
    fn redirected_flag_is_unauthenticated() {
        let reply = classify_cart_reply(200, br#"{"success":false,"redirected":true}"#)
            .expect("reply");
        assert_eq!(reply, CartReply::Unauthenticated);
    }

    #[test]
    fn negative_ack_keeps_reason() {
        let reply = classify_cart_reply(400, br#"{"success":false,"error":"Agotado"}"#)
            .expect("reply");
        assert_eq!(
            reply,
            CartReply::Rejected {
                reason: Some("Agotado".to_string())
            }
        );
    }

    #[test]
    fn blank_reason_is_dropped() {
        let reply = classify_cart_reply(400, br#"{"success":false,"error":"  "}"#).expect("reply");
        assert_eq!(reply, CartReply::Rejected { reason: None });
    }

    #[test]
    fn html_body_is_malformed() {
        let err = classify_cart_reply(403, b"<html>CSRF verification failed</html>")
            .expect_err("must fail");
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn negative_item_count_is_malformed() {
        let err = classify_cart_reply(200, br#"{"success":true,"cart_total_items":-1}"#)
            .expect_err("must fail");
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }
}
