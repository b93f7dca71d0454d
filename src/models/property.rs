// src/models/property.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::patch::Patch;
use crate::models::ownership::{Owned, Ownership, TenantRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "property_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Commercial,
    Land,
    Industrial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "property_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    Planning,
    Foundation,
    Structure,
    Finishing,
    Completed,
    Sold,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 6] = [
        PropertyStatus::Planning,
        PropertyStatus::Foundation,
        PropertyStatus::Structure,
        PropertyStatus::Finishing,
        PropertyStatus::Completed,
        PropertyStatus::Sold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Planning => "planning",
            PropertyStatus::Foundation => "foundation",
            PropertyStatus::Structure => "structure",
            PropertyStatus::Finishing => "finishing",
            PropertyStatus::Completed => "completed",
            PropertyStatus::Sold => "sold",
        }
    }
}

impl std::str::FromStr for PropertyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                format!("Invalid status. Must be one of: {}", allowed.join(", "))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Property {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Apto 101 - Bloco A")]
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub address: Option<String>,
    pub unit_number: Option<String>,
    pub floor: Option<i32>,
    #[schema(example = 72.5)]
    pub area: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub garage_spots: Option<i32>,
    #[schema(value_type = Option<f64>, example = 450000.0)]
    pub price: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub construction_cost: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub expected_completion_date: Option<NaiveDate>,
    pub actual_completion_date: Option<NaiveDate>,
    pub is_sold: bool,
    pub sale_date: Option<NaiveDate>,
    #[schema(value_type = Option<f64>)]
    pub sale_price: Option<Decimal>,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Property {
    fn ownership(&self) -> Ownership {
        Ownership::Via(TenantRef::Project(self.project_id))
    }
}

// Nota de andamento de um imóvel
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PropertyUpdate {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub status: Option<PropertyStatus>,
    pub property_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for PropertyUpdate {
    fn ownership(&self) -> Ownership {
        Ownership::Via(TenantRef::Property(self.property_id))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePropertyPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Apto 101 - Bloco A")]
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default)]
    pub status: PropertyStatus,
    pub address: Option<String>,
    pub unit_number: Option<String>,
    pub floor: Option<i32>,
    #[validate(range(min = 0.0, message = "Area must be positive"))]
    pub area: Option<f64>,
    #[validate(range(min = 0, message = "Must be positive"))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, message = "Must be positive"))]
    pub bathrooms: Option<i32>,
    #[validate(range(min = 0, message = "Must be positive"))]
    pub garage_spots: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub construction_cost: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub expected_completion_date: Option<NaiveDate>,
    pub actual_completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_sold: bool,
    pub sale_date: Option<NaiveDate>,
    #[schema(value_type = Option<f64>)]
    pub sale_price: Option<Decimal>,
    pub project_id: i64,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdatePropertyPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    #[schema(value_type = Option<String>)]
    pub address: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub unit_number: Patch<String>,
    #[schema(value_type = Option<i32>)]
    pub floor: Patch<i32>,
    #[schema(value_type = Option<f64>)]
    pub area: Patch<f64>,
    #[schema(value_type = Option<i32>)]
    pub bedrooms: Patch<i32>,
    #[schema(value_type = Option<i32>)]
    pub bathrooms: Patch<i32>,
    #[schema(value_type = Option<i32>)]
    pub garage_spots: Patch<i32>,
    #[schema(value_type = Option<f64>)]
    pub price: Patch<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub construction_cost: Patch<Decimal>,
    #[schema(value_type = Option<NaiveDate>)]
    pub start_date: Patch<NaiveDate>,
    #[schema(value_type = Option<NaiveDate>)]
    pub expected_completion_date: Patch<NaiveDate>,
    #[schema(value_type = Option<NaiveDate>)]
    pub actual_completion_date: Patch<NaiveDate>,
    pub is_sold: Option<bool>,
    #[schema(value_type = Option<NaiveDate>)]
    pub sale_date: Patch<NaiveDate>,
    #[schema(value_type = Option<f64>)]
    pub sale_price: Patch<Decimal>,
    pub project_id: Option<i64>,
}

impl UpdatePropertyPayload {
    pub fn apply(self, property: &mut Property) {
        if let Some(name) = self.name {
            property.name = name;
        }
        self.description.apply_to(&mut property.description);
        if let Some(property_type) = self.property_type {
            property.property_type = property_type;
        }
        if let Some(status) = self.status {
            property.status = status;
        }
        self.address.apply_to(&mut property.address);
        self.unit_number.apply_to(&mut property.unit_number);
        self.floor.apply_to(&mut property.floor);
        self.area.apply_to(&mut property.area);
        self.bedrooms.apply_to(&mut property.bedrooms);
        self.bathrooms.apply_to(&mut property.bathrooms);
        self.garage_spots.apply_to(&mut property.garage_spots);
        self.price.apply_to(&mut property.price);
        self.construction_cost.apply_to(&mut property.construction_cost);
        self.start_date.apply_to(&mut property.start_date);
        self.expected_completion_date.apply_to(&mut property.expected_completion_date);
        self.actual_completion_date.apply_to(&mut property.actual_completion_date);
        if let Some(is_sold) = self.is_sold {
            property.is_sold = is_sold;
        }
        self.sale_date.apply_to(&mut property.sale_date);
        self.sale_price.apply_to(&mut property.sale_price);
        if let Some(project_id) = self.project_id {
            property.project_id = project_id;
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePropertyUpdatePayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    #[validate(length(min = 1, message = "required"))]
    pub content: String,
    pub status: Option<PropertyStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_from_path_segment() {
        assert_eq!("finishing".parse::<PropertyStatus>(), Ok(PropertyStatus::Finishing));

        let err = "demolished".parse::<PropertyStatus>().unwrap_err();
        assert!(err.contains("planning, foundation, structure, finishing, completed, sold"));
    }

    #[test]
    fn type_field_keeps_its_wire_name() {
        let payload: CreatePropertyPayload = serde_json::from_str(
            r#"{"name": "Casa 3", "type": "house", "project_id": 9}"#,
        )
        .unwrap();
        assert_eq!(payload.property_type, PropertyType::House);
        assert_eq!(payload.status, PropertyStatus::Planning);
        assert!(!payload.is_sold);
    }
}
