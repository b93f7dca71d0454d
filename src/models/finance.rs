// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::patch::Patch;
use crate::models::ownership::{Owned, Ownership, TenantRef};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "expense_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Materials,      // Materiais
    Labor,          // Mão de obra
    Taxes,          // Impostos
    Permits,        // Licenças/Alvarás
    Services,       // Serviços
    Equipment,      // Equipamentos
    Utilities,      // Água, luz
    Marketing,
    Administrative,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 10] = [
        ExpenseCategory::Materials,
        ExpenseCategory::Labor,
        ExpenseCategory::Taxes,
        ExpenseCategory::Permits,
        ExpenseCategory::Services,
        ExpenseCategory::Equipment,
        ExpenseCategory::Utilities,
        ExpenseCategory::Marketing,
        ExpenseCategory::Administrative,
        ExpenseCategory::Other,
    ];
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Expense {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Cimento CP-II 50kg (200 sacos)")]
    pub description: String,
    pub category: ExpenseCategory,
    #[schema(value_type = f64, example = 7800.0)]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub supplier_name: Option<String>,
    pub supplier_document: Option<String>,
    pub supplier_contact: Option<String>,
    pub receipt_path: Option<String>,
    pub receipt_description: Option<String>,
    pub notes: Option<String>,
    pub project_id: i64,
    pub property_id: Option<i64>,
    pub created_by_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Expense {
    fn ownership(&self) -> Ownership {
        Ownership::Via(TenantRef::Project(self.project_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    #[schema(value_type = f64)]
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpenseSummary {
    #[schema(value_type = f64)]
    pub total: Decimal,
    pub by_category: Vec<CategoryTotal>,
}

impl ExpenseSummary {
    /// Monta o resumo com todas as categorias, zerando as que não têm despesa.
    pub fn from_totals(rows: Vec<CategoryTotal>) -> Self {
        let by_category: Vec<CategoryTotal> = ExpenseCategory::ALL
            .into_iter()
            .map(|category| CategoryTotal {
                category,
                total: rows
                    .iter()
                    .filter(|r| r.category == category)
                    .map(|r| r.total)
                    .sum(),
            })
            .collect();
        let total = by_category.iter().map(|c| c.total).sum();
        Self { total, by_category }
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateExpensePayload {
    #[validate(length(min = 1, message = "required"))]
    pub description: String,
    pub category: ExpenseCategory,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub project_id: i64,
    pub property_id: Option<i64>,
    pub supplier_name: Option<String>,
    pub supplier_document: Option<String>,
    pub supplier_contact: Option<String>,
    pub receipt_description: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateExpensePayload {
    #[validate(length(min = 1, message = "required"))]
    pub description: Option<String>,
    pub category: Option<ExpenseCategory>,
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub project_id: Option<i64>,
    #[schema(value_type = Option<i64>)]
    pub property_id: Patch<i64>,
    #[schema(value_type = Option<String>)]
    pub supplier_name: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub supplier_document: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub supplier_contact: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub receipt_description: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
}

impl UpdateExpensePayload {
    pub fn apply(self, expense: &mut Expense) {
        if let Some(description) = self.description {
            expense.description = description;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
        if let Some(project_id) = self.project_id {
            expense.project_id = project_id;
        }
        self.property_id.apply_to(&mut expense.property_id);
        self.supplier_name.apply_to(&mut expense.supplier_name);
        self.supplier_document.apply_to(&mut expense.supplier_document);
        self.supplier_contact.apply_to(&mut expense.supplier_contact);
        self.receipt_description.apply_to(&mut expense.receipt_description);
        self.notes.apply_to(&mut expense.notes);
    }
}

// Só para o Swagger: formato do multipart de recibo
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ReceiptUploadForm {
    pub description: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn summary_lists_every_category_and_sums_total() {
        let rows = vec![
            CategoryTotal { category: ExpenseCategory::Labor, total: Decimal::new(150000, 2) },
            CategoryTotal { category: ExpenseCategory::Materials, total: Decimal::new(32050, 2) },
        ];
        let summary = ExpenseSummary::from_totals(rows);

        assert_eq!(summary.by_category.len(), ExpenseCategory::ALL.len());
        assert_eq!(summary.total, Decimal::new(182050, 2));
        let taxes = summary
            .by_category
            .iter()
            .find(|c| c.category == ExpenseCategory::Taxes)
            .unwrap();
        assert_eq!(taxes.total, Decimal::ZERO);
    }

    #[test]
    fn clearing_property_is_distinct_from_leaving_it() {
        let mut expense = Expense {
            id: 1,
            description: "Areia".into(),
            category: ExpenseCategory::Materials,
            amount: Decimal::new(1000, 0),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            supplier_name: None,
            supplier_document: None,
            supplier_contact: None,
            receipt_path: None,
            receipt_description: None,
            notes: None,
            project_id: 1,
            property_id: Some(4),
            created_by_id: Some(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let keep: UpdateExpensePayload = serde_json::from_str(r#"{"notes": "nf 123"}"#).unwrap();
        keep.apply(&mut expense);
        assert_eq!(expense.property_id, Some(4));

        let clear: UpdateExpensePayload = serde_json::from_str(r#"{"property_id": null}"#).unwrap();
        clear.apply(&mut expense);
        assert_eq!(expense.property_id, None);
    }
}
