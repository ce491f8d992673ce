//! Wire types for the store backend.
//!
//! The backend has returned several response shapes over time. Each accepted
//! shape is declared here and decoded explicitly; anything else is a
//! [`ApiError::Decode`] instead of a silently empty result.

use mystore_core::{ProductId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::ApiError;
use crate::cart::Cart;

// =============================================================================
// Product Types
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProduct")]
pub struct Product {
    /// Product id.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image URL or file name.
    pub image: String,
    /// Units in stock; 0 or less means sold out.
    pub stock: i64,
}

impl Product {
    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Product as it appears on the wire, before id resolution.
#[derive(Deserialize)]
struct RawProduct {
    id: Option<ProductId>,
    #[serde(rename = "_id")]
    document_id: Option<ProductId>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, deserialize_with = "lenient_stock")]
    stock: i64,
}

impl TryFrom<RawProduct> for Product {
    type Error = String;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.document_id)
            .filter(|id| !id.is_blank())
            .ok_or_else(|| format!("product {:?} has no id", raw.name))?;
        Ok(Self {
            id,
            name: raw.name,
            description: raw.description.unwrap_or_default(),
            price: raw.price,
            image: raw.image.unwrap_or_default(),
            stock: raw.stock,
        })
    }
}

/// Stock arrives as a number, a numeric string, or not at all.
fn lenient_stock<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    #[allow(clippy::cast_possible_truncation)] // Stock counts are far below i64::MAX
    let stock = match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };
    Ok(stock)
}

/// Accepted envelopes for a product list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductListEnvelope {
    Bare(Vec<Product>),
    Products { products: Vec<Product> },
    Data { data: Vec<Product> },
}

/// Accepted envelopes for a single product.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductEnvelope {
    Product { product: Product },
    Data { data: Product },
    Bare(Product),
}

/// Decode a product list response body.
///
/// # Errors
///
/// Returns `ApiError::Decode` if the body is not one of the accepted
/// envelopes or a product inside it is malformed.
pub fn decode_product_list(body: &str) -> Result<Vec<Product>, ApiError> {
    let envelope: ProductListEnvelope = serde_json::from_str(body)
        .map_err(|e| ApiError::Decode(format!("product list: {e}")))?;
    Ok(match envelope {
        ProductListEnvelope::Bare(products)
        | ProductListEnvelope::Products { products }
        | ProductListEnvelope::Data { data: products } => products,
    })
}

/// Decode a single product response body.
///
/// # Errors
///
/// Returns `ApiError::Decode` if the body is not an accepted envelope.
pub fn decode_product(body: &str) -> Result<Product, ApiError> {
    let envelope: ProductEnvelope =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(format!("product: {e}")))?;
    Ok(match envelope {
        ProductEnvelope::Product { product }
        | ProductEnvelope::Data { data: product }
        | ProductEnvelope::Bare(product) => product,
    })
}

// =============================================================================
// Order Types
// =============================================================================

/// One line of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// Body of `POST /sales/checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub order_items: Vec<OrderItem>,
}

impl OrderPayload {
    /// Capture the cart's names and prices as they are now.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            order_items: cart
                .items()
                .iter()
                .map(|item| OrderItem {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

/// The server's confirmation of a placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    /// Human-readable message, if the server sent one.
    pub message: Option<String>,
    /// Full response body (`Null` for an empty body).
    pub body: serde_json::Value,
}

impl OrderConfirmation {
    /// Decode a success response body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if a non-empty body is not JSON.
    pub fn decode(body: &str) -> Result<Self, ApiError> {
        let body = if body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(body)
                .map_err(|e| ApiError::Decode(format!("order confirmation: {e}")))?
        };
        let message = body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        Ok(Self { message, body })
    }
}

// =============================================================================
// Auth Types
// =============================================================================

/// Body of the login endpoints.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of the registration endpoint.
#[derive(Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// A successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Backend-issued bearer token.
    pub token: String,
    /// The signed-in account, when returned.
    #[serde(default)]
    pub user: Option<AccountSummary>,
}

/// A successful registration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    /// The created account, when returned.
    #[serde(default)]
    pub user: Option<AccountSummary>,
}

/// Account details returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountSummary {
    #[serde(default, alias = "_id")]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Error body returned by the backend on failure.
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Extract the server's error message from a failure body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .filter(|m| !m.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cart::LineItem;

    const MUG: &str = r#"{"id":"p1","name":"Mug","description":"Ceramic","price":12.5,"image":"mug.jpg","stock":4}"#;

    #[test]
    fn test_decode_bare_list() {
        let products = decode_product_list(&format!("[{MUG}]")).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id.as_str(), "p1");
        assert_eq!(products[0].price, Decimal::new(125, 1));
        assert!(products[0].in_stock());
    }

    #[test]
    fn test_decode_wrapped_lists() {
        let products = decode_product_list(&format!(r#"{{"products":[{MUG}]}}"#)).unwrap();
        assert_eq!(products.len(), 1);

        let products = decode_product_list(&format!(r#"{{"data":[{MUG}],"total":1}}"#)).unwrap();
        assert_eq!(products.len(), 1);

        assert!(decode_product_list("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_unknown_shapes() {
        for body in [r#"{"items":[]}"#, r#"{"error":"boom"}"#, "null", "not json", r#"[{"name":"x"}]"#] {
            assert!(
                matches!(decode_product_list(body), Err(ApiError::Decode(_))),
                "{body} should not decode"
            );
        }
    }

    #[test]
    fn test_decode_document_id_and_lenient_fields() {
        let body = r#"[{"_id":"65a1","name":"Tee","price":"19.99","stock":"7"},
                       {"_id":"65a2","id":"65a2","name":"Cap","price":5,"stock":null}]"#;
        let products = decode_product_list(body).unwrap();

        assert_eq!(products[0].id.as_str(), "65a1");
        assert_eq!(products[0].price, Decimal::new(1999, 2));
        assert_eq!(products[0].stock, 7);
        assert_eq!(products[0].description, "");

        assert_eq!(products[1].id.as_str(), "65a2");
        assert_eq!(products[1].stock, 0);
        assert!(!products[1].in_stock());
    }

    #[test]
    fn test_decode_single_product() {
        assert_eq!(decode_product(MUG).unwrap().name, "Mug");
        assert_eq!(
            decode_product(&format!(r#"{{"product":{MUG}}}"#)).unwrap().id.as_str(),
            "p1"
        );
        assert!(decode_product("[]").is_err());
    }

    #[test]
    fn test_order_payload_shape() {
        let mut cart = Cart::new();
        cart.add(LineItem::new("p1", "Mug", Decimal::new(1250, 2), 2, "mug.jpg"))
            .unwrap();

        let json = serde_json::to_value(OrderPayload::from_cart(&cart)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "orderItems": [{"id": "p1", "name": "Mug", "unitPrice": 12.5, "quantity": 2}]
            })
        );
    }

    #[test]
    fn test_order_confirmation_decode() {
        let confirmation =
            OrderConfirmation::decode(r#"{"message":"Order placed","saleId":"s1"}"#).unwrap();
        assert_eq!(confirmation.message.as_deref(), Some("Order placed"));
        assert_eq!(confirmation.body["saleId"], "s1");

        assert_eq!(OrderConfirmation::decode("").unwrap().body, serde_json::Value::Null);
        assert!(OrderConfirmation::decode("<html>").is_err());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"error":"Out of stock"}"#).as_deref(), Some("Out of stock"));
        assert_eq!(error_message(r#"{"message":"Invalid token"}"#).as_deref(), Some("Invalid token"));
        assert_eq!(error_message(r#"{"error":""}"#), None);
        assert_eq!(error_message("Bad Gateway"), None);
    }

    #[test]
    fn test_login_response() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"token":"jwt","user":{"_id":"u1","name":"Ada","email":"ada@example.com"}}"#,
        )
        .unwrap();
        assert_eq!(response.token, "jwt");
        let user = response.user.unwrap();
        assert_eq!(user.id, Some(UserId::new("u1")));
        assert_eq!(user.name, "Ada");
    }
}
