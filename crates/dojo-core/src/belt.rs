//! Belt ranks.
//!
//! A belt is a colour plus a degree (stripes) between 0 and 10 inclusive.

use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Highest degree a belt can carry.
pub const MAX_DEGREE: u8 = 10;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BeltColor {
  White,
  Grey,
  Yellow,
  Orange,
  Green,
  Blue,
  Purple,
  Brown,
  Black,
  Coral,
  Red,
}

impl BeltColor {
  /// The string stored in belt columns.
  pub fn as_str(self) -> &'static str { self.into() }
}

/// A belt colour and its degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Belt {
  pub color:  BeltColor,
  pub degree: u8,
}

impl Belt {
  /// Build a belt, rejecting degrees above [`MAX_DEGREE`].
  pub fn new(color: BeltColor, degree: u8) -> Result<Self> {
    let belt = Self { color, degree };
    belt.validate()?;
    Ok(belt)
  }

  pub fn validate(&self) -> Result<()> { validate_degree(self.degree) }
}

pub fn validate_degree(degree: u8) -> Result<()> {
  if degree > MAX_DEGREE {
    return Err(Error::Validation(format!(
      "belt degree must be between 0 and {MAX_DEGREE}, got {degree}"
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn degree_bounds() {
    assert!(Belt::new(BeltColor::Blue, 0).is_ok());
    assert!(Belt::new(BeltColor::Black, 10).is_ok());
    assert!(matches!(
      Belt::new(BeltColor::Black, 11),
      Err(Error::Validation(_))
    ));
  }

  #[test]
  fn color_column_encoding() {
    assert_eq!(BeltColor::Purple.as_str(), "purple");
    assert_eq!("brown".parse::<BeltColor>().unwrap(), BeltColor::Brown);
    assert!("plaid".parse::<BeltColor>().is_err());
  }
}
