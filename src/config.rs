use crate::error::DocFlowError;
use crate::style::TextStyle;
use crate::totals::{MoneyFormat, TaxPolicy};
use crate::types::{Color, Pt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    pub regular: Arc<str>,
    pub bold: Arc<str>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            regular: Arc::<str>::from("Helvetica"),
            bold: Arc::<str>::from("Helvetica-Bold"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSizes {
    pub title: Pt,
    pub heading: Pt,
    pub body: Pt,
    pub detail: Pt,
    pub footer: Pt,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: Pt::from_i32(18),
            heading: Pt::from_i32(12),
            body: Pt::from_i32(10),
            detail: Pt::from_i32(8),
            footer: Pt::from_i32(8),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub rule: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            text: Color::rgb(33, 37, 41),
            muted: Color::rgb(108, 117, 125),
            accent: Color::rgb(44, 62, 80),
            rule: Color::rgb(206, 212, 218),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    pub row_height: Pt,
    pub header_height: Pt,
    pub cell_padding: Pt,
    /// Shares of the content width for description, quantity, unit price
    /// and line total.
    pub column_fractions: [f32; 4],
    pub header_fill: Color,
    pub header_text: Color,
    pub stripe_even: Color,
    pub stripe_odd: Color,
    pub row_rule: Option<Color>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_height: Pt::from_i32(22),
            header_height: Pt::from_i32(22),
            cell_padding: Pt::from_i32(6),
            column_fractions: [0.49, 0.11, 0.20, 0.20],
            header_fill: Color::rgb(44, 62, 80),
            header_text: Color::WHITE,
            stripe_even: Color::WHITE,
            stripe_odd: Color::rgb(244, 246, 248),
            row_rule: Some(Color::rgb(222, 226, 230)),
        }
    }
}

/// Every fixed string printed on the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub quotation_title: String,
    pub proposal_title: String,
    pub reference: String,
    pub date: String,
    pub prepared_for: String,
    pub subject: String,
    pub breakdown: String,
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub line_total: String,
    pub subtotal: String,
    pub discount: String,
    pub fixed_discount: String,
    pub tax: String,
    pub total: String,
    pub notes: String,
    pub terms: String,
    pub attachments: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            quotation_title: "QUOTATION".to_string(),
            proposal_title: "PROPOSAL".to_string(),
            reference: "Ref".to_string(),
            date: "Date".to_string(),
            prepared_for: "Prepared for".to_string(),
            subject: "Subject".to_string(),
            breakdown: "Cost Breakdown".to_string(),
            description: "Description".to_string(),
            quantity: "Qty".to_string(),
            unit_price: "Unit Price".to_string(),
            line_total: "Total".to_string(),
            subtotal: "Subtotal".to_string(),
            discount: "Discount".to_string(),
            fixed_discount: "fixed".to_string(),
            tax: "VAT".to_string(),
            total: "Total".to_string(),
            notes: "Notes".to_string(),
            terms: "Terms & Conditions".to_string(),
            attachments: "Attachments".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterConfig {
    pub message: String,
    /// `{page}` and `{pages}` are replaced once the page count is known.
    pub page_label: String,
    pub rule: bool,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            message: "Thank you for your business!".to_string(),
            page_label: "Page {page} of {pages}".to_string(),
            rule: true,
        }
    }
}

/// Appearance and policy knobs for a layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub fonts: FontConfig,
    pub sizes: FontSizes,
    pub palette: Palette,
    pub table: TableConfig,
    pub labels: Labels,
    pub money: MoneyFormat,
    pub tax: TaxPolicy,
    pub footer: FooterConfig,
    pub section_gap: Pt,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            fonts: FontConfig::default(),
            sizes: FontSizes::default(),
            palette: Palette::default(),
            table: TableConfig::default(),
            labels: Labels::default(),
            money: MoneyFormat::default(),
            tax: TaxPolicy::default(),
            footer: FooterConfig::default(),
            section_gap: Pt::from_i32(14),
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(json: &str) -> Result<Self, DocFlowError> {
        let config: LayoutConfig = serde_json::from_str(json)
            .map_err(|err| DocFlowError::invalid(format!("layout config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DocFlowError> {
        let sizes = [
            ("title", self.sizes.title),
            ("heading", self.sizes.heading),
            ("body", self.sizes.body),
            ("detail", self.sizes.detail),
            ("footer", self.sizes.footer),
        ];
        for (name, size) in sizes {
            if !size.is_positive() {
                return Err(DocFlowError::invalid(format!(
                    "font size {name} must be positive"
                )));
            }
        }
        if !self.table.row_height.is_positive() || !self.table.header_height.is_positive() {
            return Err(DocFlowError::invalid("table row heights must be positive"));
        }
        if self.table.cell_padding < Pt::ZERO {
            return Err(DocFlowError::invalid("table cell padding cannot be negative"));
        }
        let fractions = self.table.column_fractions;
        if fractions.iter().any(|f| !f.is_finite() || *f <= 0.0) {
            return Err(DocFlowError::invalid("table column fractions must be positive"));
        }
        let sum: f32 = fractions.iter().sum();
        if sum > 1.0 + 1e-4 {
            return Err(DocFlowError::invalid(format!(
                "table column fractions sum to {sum}, more than the content width"
            )));
        }
        if self.section_gap < Pt::ZERO {
            return Err(DocFlowError::invalid("section gap cannot be negative"));
        }
        if self.tax.rate_bps > 100_000 {
            return Err(DocFlowError::invalid(format!(
                "tax rate {} bps is not plausible",
                self.tax.rate_bps
            )));
        }
        Ok(())
    }

    pub(crate) fn regular(&self, size: Pt, color: Color) -> TextStyle {
        TextStyle::new(self.fonts.regular.clone(), size, color)
    }

    pub(crate) fn bold(&self, size: Pt, color: Color) -> TextStyle {
        TextStyle::new(self.fonts.bold.clone(), size, color)
    }
}
