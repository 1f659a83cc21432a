//! Reporting service for ROI and questionnaire exports
//! Produces the ROI breakdown as CSV and the questionnaire as an Excel workbook

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{
    answer_value, find_question, questions_in, Answers, Category, Company, QuestionType,
    RoiResult,
};

use crate::error::{AppError, AppResult};

/// Supported ROI export formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// One line of the ROI CSV export
#[derive(Debug, Serialize)]
pub struct RoiCsvRow {
    pub section: &'static str,
    pub item: String,
    pub amount: Decimal,
    pub percentage: Option<Decimal>,
}

/// Reporting service
pub struct ReportingService;

impl ReportingService {
    /// Flatten an ROI result into summary, savings and projection rows
    pub fn roi_rows(result: &RoiResult) -> Vec<RoiCsvRow> {
        let summary = &result.summary;
        let mut rows = vec![
            RoiCsvRow::summary("Total investment", summary.total_investment),
            RoiCsvRow::summary("Annual savings", summary.annual_savings),
            RoiCsvRow::summary("Three-year savings", summary.three_year_savings),
            RoiCsvRow::summary("Net benefit", summary.net_benefit),
            RoiCsvRow {
                section: "summary",
                item: "ROI".to_string(),
                amount: summary.roi_percent,
                percentage: Some(summary.roi_percent),
            },
        ];
        if let Some(months) = summary.payback_period_months {
            rows.push(RoiCsvRow::summary("Payback period (months)", Decimal::from(months)));
        }

        rows.extend(result.savings_breakdown.iter().map(|item| RoiCsvRow {
            section: "savings",
            item: item.label.clone(),
            amount: item.amount,
            percentage: Some(item.percentage),
        }));

        for year in &result.projections {
            rows.push(RoiCsvRow {
                section: "projection",
                item: format!("Year {} net benefit", year.year),
                amount: year.net_benefit,
                percentage: None,
            });
            rows.push(RoiCsvRow {
                section: "projection",
                item: format!("Year {} cumulative net benefit", year.year),
                amount: year.cumulative_net_benefit,
                percentage: None,
            });
        }

        rows
    }

    /// ROI breakdown as CSV text
    pub fn roi_csv(result: &RoiResult) -> AppResult<String> {
        Self::export_to_csv(&Self::roi_rows(result))
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Export(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Export(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Export(format!("UTF-8 conversion error: {}", e)))
    }

    /// Questionnaire workbook: a summary sheet, then one sheet per category
    pub fn questionnaire_workbook(
        company: &Company,
        answers: &Answers,
        result: &RoiResult,
    ) -> AppResult<Vec<u8>> {
        Self::build_workbook(company, answers, result)
            .map_err(|e| AppError::Export(format!("Excel export failed: {}", e)))
    }

    fn build_workbook(
        company: &Company,
        answers: &Answers,
        result: &RoiResult,
    ) -> Result<Vec<u8>, XlsxError> {
        let bold = Format::new().set_bold();
        let mut workbook = Workbook::new();

        let mut summary = Worksheet::new();
        summary.set_name("Summary")?;
        summary.set_column_width(0, 28.0)?;
        summary.set_column_width(1, 40.0)?;
        summary.write_string_with_format(0, 0, "Company", &bold)?;
        summary.write_string(0, 1, &company.name)?;
        summary.write_string_with_format(1, 0, "Exported", &bold)?;
        summary.write_string(1, 1, Utc::now().format("%Y-%m-%d %H:%M UTC").to_string())?;
        summary.write_string_with_format(2, 0, "Overall score (%)", &bold)?;
        summary.write_number(2, 1, to_f64(result.summary.overall_score))?;
        summary.write_string_with_format(3, 0, "Maturity level", &bold)?;
        summary.write_string(3, 1, result.summary.maturity_level.to_string())?;
        summary.write_string_with_format(4, 0, "Annual savings", &bold)?;
        summary.write_number(4, 1, to_f64(result.summary.annual_savings))?;
        summary.write_string_with_format(5, 0, "ROI (%)", &bold)?;
        summary.write_number(5, 1, to_f64(result.summary.roi_percent))?;

        summary.write_string_with_format(7, 0, "Category", &bold)?;
        summary.write_string_with_format(7, 1, "Score (%)", &bold)?;
        for (row, score) in (8u32..).zip(&result.category_scores) {
            summary.write_string(row, 0, &score.label)?;
            summary.write_number(row, 1, to_f64(score.percent_score))?;
        }
        workbook.push_worksheet(summary);

        for category in Category::ALL {
            let mut sheet = Worksheet::new();
            sheet.set_name(category.display_name())?;
            sheet.set_column_width(0, 70.0)?;
            sheet.set_column_width(1, 16.0)?;
            sheet.set_column_width(2, 40.0)?;
            sheet.write_string_with_format(0, 0, "Question", &bold)?;
            sheet.write_string_with_format(0, 1, "Answer", &bold)?;
            sheet.write_string_with_format(0, 2, "Details", &bold)?;

            for (row, question) in (1u32..).zip(questions_in(category)) {
                sheet.write_string(row, 0, question.text)?;
                match answers.get(question.id) {
                    Some(value) if !value.is_null() => {
                        write_answer(&mut sheet, row, value)?;
                        if let Some(details) = answer_details(question.id, value) {
                            sheet.write_string(row, 2, details)?;
                        }
                    }
                    _ => {
                        sheet.write_string(row, 2, "Not answered")?;
                    }
                }
            }
            workbook.push_worksheet(sheet);
        }

        workbook.save_to_buffer()
    }
}

impl RoiCsvRow {
    fn summary(item: &str, amount: Decimal) -> Self {
        Self {
            section: "summary",
            item: item.to_string(),
            amount,
            percentage: None,
        }
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn write_answer(sheet: &mut Worksheet, row: u32, value: &Value) -> Result<(), XlsxError> {
    match value {
        Value::Number(n) => {
            sheet.write_number(row, 1, n.as_f64().unwrap_or_default())?;
        }
        Value::String(s) => {
            sheet.write_string(row, 1, s)?;
        }
        other => {
            sheet.write_string(row, 1, other.to_string())?;
        }
    }
    Ok(())
}

/// Option label for radio answers, unit for numeric ones
fn answer_details(question_id: &str, value: &Value) -> Option<String> {
    let question = find_question(question_id)?;
    match question.question_type {
        QuestionType::Radio => {
            let chosen = answer_value(value);
            question
                .options
                .iter()
                .find(|option| Decimal::from(option.value) == chosen)
                .map(|option| option.label.to_string())
        }
        QuestionType::Number => question.unit.map(|unit| format!("{:?}", unit)),
    }
}
