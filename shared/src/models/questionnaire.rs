//! Questionnaire catalogue
//!
//! The maturity assessment is a fixed list of questions. Financial questions
//! are numeric and feed the savings model; every other category is scored on
//! a 0-4 maturity scale.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Question categories, in presentation order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Financial,
    InventoryManagement,
    WarehouseOperations,
    LaborManagement,
    TechnologySystems,
    TransportationLogistics,
    QualityCompliance,
}

impl Category {
    /// Categories scored on the maturity scale
    pub const ASSESSMENT: [Category; 6] = [
        Category::InventoryManagement,
        Category::WarehouseOperations,
        Category::LaborManagement,
        Category::TechnologySystems,
        Category::TransportationLogistics,
        Category::QualityCompliance,
    ];

    pub const ALL: [Category; 7] = [
        Category::Financial,
        Category::InventoryManagement,
        Category::WarehouseOperations,
        Category::LaborManagement,
        Category::TechnologySystems,
        Category::TransportationLogistics,
        Category::QualityCompliance,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Financial => "Financial Metrics",
            Category::InventoryManagement => "Inventory Management",
            Category::WarehouseOperations => "Warehouse Operations",
            Category::LaborManagement => "Labor Management",
            Category::TechnologySystems => "Technology & Systems",
            Category::TransportationLogistics => "Transportation & Logistics",
            Category::QualityCompliance => "Quality & Compliance",
        }
    }

    pub fn is_assessment(&self) -> bool {
        !matches!(self, Category::Financial)
    }

    /// Suggested first step when this category has room to improve
    pub fn recommendation(&self) -> &'static str {
        match self {
            Category::Financial => "",
            Category::InventoryManagement => {
                "Introduce cycle counting and demand-driven replenishment to cut carrying cost and write-offs"
            }
            Category::WarehouseOperations => {
                "Re-slot fast movers and standardize receiving to free up floor space"
            }
            Category::LaborManagement => {
                "Adopt engineered labor standards and shift planning tied to order volume"
            }
            Category::TechnologySystems => {
                "Consolidate on a WMS with scanning and system integration to raise throughput per FTE"
            }
            Category::TransportationLogistics => {
                "Use load planning and carrier scorecards to reduce freight spend"
            }
            Category::QualityCompliance => {
                "Add inbound inspection and lot traceability to lower defect and audit costs"
            }
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How a question is answered
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Radio,
    Number,
}

/// Scale applied to numeric answers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Millions,
    Thousands,
    Units,
}

impl Unit {
    pub fn multiplier(&self) -> Decimal {
        match self {
            Unit::Millions => Decimal::from(1_000_000),
            Unit::Thousands => Decimal::ONE_THOUSAND,
            Unit::Units => Decimal::ONE,
        }
    }
}

/// A selectable answer for radio questions
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuestionOption {
    pub label: &'static str,
    pub value: i64,
}

/// A question in the catalogue
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub category: Category,
    pub text: &'static str,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: &'static [QuestionOption],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

/// Identifiers of the financial questions read by the ROI model
pub mod ids {
    pub const ANNUAL_REVENUE: &str = "annual_revenue";
    pub const FTE_COUNT: &str = "fte_count";
    pub const COST_PER_FTE: &str = "cost_per_fte";
    pub const ANNUAL_WASTE_VALUE: &str = "annual_waste_value";
    pub const TRANSPORTATION_COST: &str = "transportation_cost";
    pub const WAREHOUSE_SIZE: &str = "warehouse_size";
    pub const LICENSE_COST: &str = "license_cost";
    pub const IMPLEMENTATION_COST: &str = "implementation_cost";
}

/// Shared 0-4 maturity scale
pub const MATURITY_OPTIONS: &[QuestionOption] = &[
    QuestionOption { label: "Not in place", value: 0 },
    QuestionOption { label: "Ad hoc / manual", value: 1 },
    QuestionOption { label: "Partially implemented", value: 2 },
    QuestionOption { label: "Standardized", value: 3 },
    QuestionOption { label: "Fully optimized", value: 4 },
];

const fn number(id: &'static str, text: &'static str, unit: Unit) -> Question {
    Question {
        id,
        category: Category::Financial,
        text,
        question_type: QuestionType::Number,
        options: &[],
        unit: Some(unit),
    }
}

const fn radio(id: &'static str, category: Category, text: &'static str) -> Question {
    Question {
        id,
        category,
        text,
        question_type: QuestionType::Radio,
        options: MATURITY_OPTIONS,
        unit: None,
    }
}

pub static QUESTIONS: &[Question] = &[
    // Financial
    number(ids::ANNUAL_REVENUE, "What is your annual revenue (in millions)?", Unit::Millions),
    number(ids::FTE_COUNT, "How many full-time employees work in your warehouses?", Unit::Units),
    number(ids::COST_PER_FTE, "What is the average fully loaded cost per FTE (in thousands)?", Unit::Thousands),
    number(ids::ANNUAL_WASTE_VALUE, "What is the annual value of inventory waste and write-offs (in thousands)?", Unit::Thousands),
    number(ids::TRANSPORTATION_COST, "What is your annual transportation spend (in thousands)?", Unit::Thousands),
    number(ids::WAREHOUSE_SIZE, "What is your total warehouse footprint (square feet)?", Unit::Units),
    number(ids::LICENSE_COST, "What is the expected annual software license cost (in millions)?", Unit::Millions),
    number(ids::IMPLEMENTATION_COST, "What is the expected one-time implementation cost (in millions)?", Unit::Millions),
    // Inventory management
    radio("inv_accuracy", Category::InventoryManagement, "How accurate are your inventory records?"),
    radio("inv_cycle_counting", Category::InventoryManagement, "How mature is your cycle counting program?"),
    radio("inv_replenishment", Category::InventoryManagement, "How is replenishment triggered?"),
    radio("inv_visibility", Category::InventoryManagement, "How much real-time visibility do you have into stock levels?"),
    // Warehouse operations
    radio("ops_layout", Category::WarehouseOperations, "How well is the warehouse layout optimized for flow?"),
    radio("ops_picking", Category::WarehouseOperations, "How efficient are your picking methods?"),
    radio("ops_receiving", Category::WarehouseOperations, "How standardized is receiving and putaway?"),
    radio("ops_slotting", Category::WarehouseOperations, "How often is slotting reviewed against demand?"),
    // Labor management
    radio("labor_planning", Category::LaborManagement, "How is labor planned against expected volume?"),
    radio("labor_tracking", Category::LaborManagement, "How is individual and team productivity tracked?"),
    radio("labor_training", Category::LaborManagement, "How structured is onboarding and cross-training?"),
    // Technology & systems
    radio("tech_wms", Category::TechnologySystems, "What warehouse management system capability is in place?"),
    radio("tech_automation", Category::TechnologySystems, "How much material handling is automated?"),
    radio("tech_integration", Category::TechnologySystems, "How well are WMS, ERP and TMS integrated?"),
    radio("tech_analytics", Category::TechnologySystems, "How are operational metrics reported and analyzed?"),
    // Transportation & logistics
    radio("trans_planning", Category::TransportationLogistics, "How are loads and routes planned?"),
    radio("trans_carrier_management", Category::TransportationLogistics, "How are carriers selected and measured?"),
    radio("trans_visibility", Category::TransportationLogistics, "How much shipment tracking visibility do you have?"),
    // Quality & compliance
    radio("qual_inspection", Category::QualityCompliance, "How are inbound and outbound quality checks performed?"),
    radio("qual_returns", Category::QualityCompliance, "How are returns and damages analyzed?"),
    radio("comp_traceability", Category::QualityCompliance, "How complete is lot and serial traceability?"),
    radio("comp_audits", Category::QualityCompliance, "How prepared are you for regulatory and customer audits?"),
];

/// Look up a question by id
pub fn find_question(id: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

/// Questions belonging to a category, in catalogue order
pub fn questions_in(category: Category) -> impl Iterator<Item = &'static Question> {
    QUESTIONS.iter().filter(move |q| q.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_question_ids_are_unique() {
        let ids: HashSet<_> = QUESTIONS.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), QUESTIONS.len());
    }

    #[test]
    fn test_every_assessment_category_has_questions() {
        for category in Category::ASSESSMENT {
            assert!(questions_in(category).count() > 0, "{} has no questions", category);
        }
    }

    #[test]
    fn test_financial_questions_are_numeric_with_units() {
        for q in questions_in(Category::Financial) {
            assert_eq!(q.question_type, QuestionType::Number);
            assert!(q.unit.is_some());
        }
        for category in Category::ASSESSMENT {
            for q in questions_in(category) {
                assert_eq!(q.question_type, QuestionType::Radio);
                assert_eq!(q.options.len(), 5);
            }
        }
    }

    #[test]
    fn test_find_question() {
        let q = find_question(ids::ANNUAL_REVENUE).unwrap();
        assert_eq!(q.unit, Some(Unit::Millions));
        assert!(find_question("does_not_exist").is_none());
    }

    #[test]
    fn test_question_serializes_type_field() {
        let json = serde_json::to_value(find_question("ops_picking").unwrap()).unwrap();
        assert_eq!(json["type"], "radio");
        assert_eq!(json["category"], "warehouse_operations");
        assert!(json.get("unit").is_none());
    }
}
