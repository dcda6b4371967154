// src/models/customer.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::coerce;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[serde(default, deserialize_with = "coerce::de_f64")]
    #[schema(example = -33.301)]
    pub lat: f64,
    #[serde(default, deserialize_with = "coerce::de_f64")]
    #[schema(example = -66.337)]
    pub lng: f64,
}

// Localização antiga em texto (ou qualquer coisa que não seja {lat, lng})
// é descartada; o cliente continua válido.
fn de_lenient_location<'de, D: Deserializer<'de>>(d: D) -> Result<Option<GeoPoint>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

// --- CLIENTE ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(deserialize_with = "coerce::de_id")]
    pub id: String,

    #[serde(default, deserialize_with = "coerce::de_string")]
    #[schema(example = "Juan Pérez")]
    pub name: String,

    #[serde(default, deserialize_with = "coerce::de_opt_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "coerce::de_opt_string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    // Endereço flexível: registros antigos têm texto, os novos podem ter objeto.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,

    #[serde(default, deserialize_with = "de_lenient_location", skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,

    #[serde(default, deserialize_with = "coerce::de_opt_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, deserialize_with = "coerce::de_opt_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 1, message = "The customer name is required."))]
    #[schema(example = "Juan Pérez")]
    pub name: String,

    #[validate(email(message = "The e-mail address is invalid."))]
    pub email: Option<String>,

    pub phone: Option<String>,

    pub address: Option<Value>,

    pub location: Option<GeoPoint>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "The customer name cannot be empty."))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "The e-mail address is invalid."))]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerDeleted {
    #[schema(example = "Customer deleted")]
    pub message: String,
    pub client: Customer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_text_location_is_ignored() {
        let customer: Customer =
            serde_json::from_value(json!({"id": "c1", "name": "Ana", "location": "Centro"})).unwrap();
        assert_eq!(customer.name, "Ana");
        assert!(customer.location.is_none());
    }

    #[test]
    fn location_coordinates_are_coerced() {
        let customer: Customer = serde_json::from_value(
            json!({"id": 7, "location": {"lat": "-33.5", "lng": -66.25}}),
        )
        .unwrap();
        assert_eq!(customer.id, "7");
        assert_eq!(customer.location, Some(GeoPoint { lat: -33.5, lng: -66.25 }));
    }
}
