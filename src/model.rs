use crate::error::DocFlowError;
use serde::{Deserialize, Deserializer, Serialize};

/// Which document is being generated, with the sections only that kind has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "documentType")]
pub enum DocumentKind {
    Quotation,
    #[serde(rename_all = "camelCase")]
    Proposal {
        #[serde(default)]
        proposal_body: Option<String>,
        #[serde(default)]
        embed_breakdown: bool,
    },
}

impl DocumentKind {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentKind::Quotation => "Quotation",
            DocumentKind::Proposal { .. } => "Proposal",
        }
    }

    /// Whether the line-item table and totals are part of the document.
    pub fn shows_breakdown(&self) -> bool {
        match self {
            DocumentKind::Quotation => true,
            DocumentKind::Proposal {
                embed_breakdown, ..
            } => *embed_breakdown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub tax_id: Option<String>,
}

impl Company {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Contact {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The party a document is addressed to: the contact's company when
    /// known, otherwise the contact's own name.
    pub fn party_name(&self) -> &str {
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|company| !company.is_empty())
            .unwrap_or(self.name.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub quantity: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, unit_price: f64, quantity: f64) -> Self {
        Self {
            description: description.into(),
            detail: None,
            unit_price: coerce_amount(unit_price),
            quantity: coerce_amount(quantity),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn unit_price(&self) -> f64 {
        coerce_amount(self.unit_price)
    }

    pub fn quantity(&self) -> f64 {
        coerce_amount(self.quantity)
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price() * self.quantity()
    }
}

/// Negative, NaN and infinite amounts count as zero.
pub fn coerce_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(value) => value,
        RawAmount::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        RawAmount::Other(_) => 0.0,
    };
    Ok(coerce_amount(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percent,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountPolicy {
    pub kind: DiscountKind,
    pub value: f64,
}

impl DiscountPolicy {
    pub fn none() -> Self {
        Self::percent(0.0)
    }

    pub fn percent(value: f64) -> Self {
        Self {
            kind: DiscountKind::Percent,
            value,
        }
    }

    pub fn fixed(value: f64) -> Self {
        Self {
            kind: DiscountKind::Fixed,
            value,
        }
    }
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    pub name: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

impl AttachmentRef {
    pub fn new(name: impl Into<String>, size_bytes: Option<u64>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }
}

/// Snapshot of everything one generated document shows. Built once per
/// generation request and read-only during layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentModel {
    #[serde(flatten)]
    pub kind: DocumentKind,
    #[serde(default)]
    pub company: Company,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default, alias = "title")]
    pub subject: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub discount: DiscountPolicy,
    #[serde(default)]
    pub tax_enabled: bool,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

impl DocumentModel {
    pub fn new(kind: DocumentKind, company: Company, contact: Contact) -> Self {
        Self {
            kind,
            company,
            contact,
            subject: String::new(),
            reference: None,
            issue_date: None,
            items: Vec::new(),
            notes: None,
            terms: None,
            discount: DiscountPolicy::none(),
            tax_enabled: false,
            attachments: Vec::new(),
        }
    }

    pub fn quotation(company: Company, contact: Contact) -> Self {
        Self::new(DocumentKind::Quotation, company, contact)
    }

    pub fn proposal(
        company: Company,
        contact: Contact,
        body: Option<String>,
        embed_breakdown: bool,
    ) -> Self {
        Self::new(
            DocumentKind::Proposal {
                proposal_body: body,
                embed_breakdown,
            },
            company,
            contact,
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, DocFlowError> {
        let model: DocumentModel = serde_json::from_str(json)
            .map_err(|err| DocFlowError::invalid(format!("document model: {err}")))?;
        model.validate()?;
        Ok(model)
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>, issue_date: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self.issue_date = Some(issue_date.into());
        self
    }

    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_discount(mut self, discount: DiscountPolicy) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_tax(mut self, enabled: bool) -> Self {
        self.tax_enabled = enabled;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = Some(terms.into());
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<AttachmentRef>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn validate(&self) -> Result<(), DocFlowError> {
        let value = self.discount.value;
        if !value.is_finite() || value < 0.0 {
            return Err(DocFlowError::invalid(format!(
                "discount value must be a non-negative number (got {value})"
            )));
        }
        Ok(())
    }
}
