//! Belt promotions and the current-belt recompute rule.
//!
//! A student's current belt is a materialised view over their promotion
//! history: it always equals the `new_belt` of the most recent promotion, or
//! is absent when the history is empty. "Most recent" means the latest
//! `promotion_date`; among promotions sharing that date the one recorded last
//! wins.
//!
//! The store calls [`current_belt`] / [`newest`] after every write to the
//! history so the rule lives in one place and can be tested without a
//! database.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Result,
  belt::{Belt, BeltColor, validate_degree},
  student::Student,
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PromotionType {
  #[default]
  Regular,
  /// The student skipped one or more ranks.
  Skip,
  Honorary,
}

impl PromotionType {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// A historical rank change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeltPromotion {
  pub promotion_id:   Uuid,
  pub student_id:     Uuid,
  /// The principal who recorded the promotion.
  pub promoted_by:    Uuid,
  /// The student's belt at the moment of promotion.
  pub previous_belt:  Option<Belt>,
  pub new_belt:       Belt,
  pub promotion_date: NaiveDate,
  pub promotion_type: PromotionType,
  pub notes:          Option<String>,
  pub recorded_at:    DateTime<Utc>,
}

/// Input to [`crate::store::AcademyStore::promote`].
#[derive(Debug, Clone)]
pub struct NewPromotion {
  pub student_id:     Uuid,
  pub new_belt:       Belt,
  pub promoted_by:    Uuid,
  /// Defaults to today (UTC) when absent.
  pub promotion_date: Option<NaiveDate>,
  pub promotion_type: PromotionType,
  pub notes:          Option<String>,
}

impl NewPromotion {
  pub fn new(student_id: Uuid, new_belt: Belt, promoted_by: Uuid) -> Self {
    Self {
      student_id,
      new_belt,
      promoted_by,
      promotion_date: None,
      promotion_type: PromotionType::default(),
      notes: None,
    }
  }

  pub fn on(mut self, date: NaiveDate) -> Self {
    self.promotion_date = Some(date);
    self
  }
}

/// Partial update applied by [`crate::store::AcademyStore::update_promotion`].
/// Uses the same flat `belt` / `degree` fields as a new promotion. `None`
/// leaves a field unchanged; changing only `belt` keeps the recorded degree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionPatch {
  pub belt:           Option<BeltColor>,
  pub degree:         Option<u8>,
  pub promotion_date: Option<NaiveDate>,
  pub promotion_type: Option<PromotionType>,
  /// Absent leaves the notes alone; `null` clears them.
  #[serde(default, deserialize_with = "present")]
  pub notes:          Option<Option<String>>,
}

/// Wraps any value that is present in the input, `null` included, in `Some`.
fn present<'de, D, T>(de: D) -> std::result::Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  T::deserialize(de).map(Some)
}

impl PromotionPatch {
  pub fn validate(&self) -> Result<()> {
    if let Some(degree) = self.degree {
      validate_degree(degree)?;
    }
    Ok(())
  }

  pub fn apply(&self, promotion: &mut BeltPromotion) {
    if let Some(color) = self.belt {
      promotion.new_belt.color = color;
    }
    if let Some(degree) = self.degree {
      promotion.new_belt.degree = degree;
    }
    if let Some(date) = self.promotion_date {
      promotion.promotion_date = date;
    }
    if let Some(kind) = self.promotion_type {
      promotion.promotion_type = kind;
    }
    if let Some(notes) = &self.notes {
      promotion.notes = notes.clone();
    }
  }
}

/// The result of a promotion write: the affected record and the student after
/// their current belt was recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionOutcome {
  pub promotion: BeltPromotion,
  pub student:   Student,
}

// ─── Recompute rule ──────────────────────────────────────────────────────────

/// The most recent promotion in `history`.
///
/// `history` must be in recording order (oldest first): ties on
/// `promotion_date` go to the later element.
pub fn newest<'a, I>(history: I) -> Option<&'a BeltPromotion>
where
  I: IntoIterator<Item = &'a BeltPromotion>,
{
  // `max_by_key` returns the last of several equal maxima.
  history.into_iter().max_by_key(|p| p.promotion_date)
}

/// The belt a student with this history should currently hold.
pub fn current_belt<'a, I>(history: I) -> Option<Belt>
where
  I: IntoIterator<Item = &'a BeltPromotion>,
{
  newest(history).map(|p| p.new_belt)
}
