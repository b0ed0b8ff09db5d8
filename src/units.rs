//! Newtypes for the monetary quantities used in the model.
//!
//! Engineering coefficients (tonnes, MW, MMBtu) are kept as plain `f64` because they only ever
//! appear as constraint coefficients. Prices and money flows are wrapped so that, for example, a
//! CO2 credit price cannot be added to an electricity price by accident.
use derive_more::{Add, AddAssign, Display, Neg, Sub, SubAssign, Sum};
use float_cmp::{ApproxEq, F64Margin};
use serde::{Deserialize, Serialize};
use std::ops::{Div, Mul};

/// Common methods for all unit types
pub trait UnitType:
    Copy
    + PartialOrd
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + Mul<f64, Output = Self>
{
    /// Create from an `f64` value
    fn new(value: f64) -> Self;

    /// Returns the underlying `f64` value
    fn value(&self) -> f64;
}

macro_rules! base_unit_struct {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            Serialize,
            Deserialize,
            Add,
            AddAssign,
            Sub,
            SubAssign,
            Neg,
            Sum,
            Display,
        )]
        #[doc = concat!("A quantity of type `", stringify!($name), "`")]
        pub struct $name(pub f64);

        impl $name {
            /// Create from an `f64` value
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Returns the underlying `f64` value
            pub const fn value(&self) -> f64 {
                self.0
            }

            /// Whether the underlying value is finite
            pub fn is_finite(&self) -> bool {
                self.0.is_finite()
            }

            /// Absolute value
            pub fn abs(&self) -> Self {
                Self(self.0.abs())
            }
        }

        impl UnitType for $name {
            fn new(value: f64) -> Self {
                Self(value)
            }

            fn value(&self) -> f64 {
                self.0
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;

            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl Mul<$name> for f64 {
            type Output = $name;

            fn mul(self, rhs: $name) -> $name {
                $name(self * rhs.0)
            }
        }

        impl Div<f64> for $name {
            type Output = $name;

            fn div(self, rhs: f64) -> $name {
                $name(self.0 / rhs)
            }
        }

        impl Div<$name> for $name {
            type Output = f64;

            fn div(self, rhs: $name) -> f64 {
                self.0 / rhs.0
            }
        }

        impl ApproxEq for $name {
            type Margin = F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                self.0.approx_eq(other.0, margin)
            }
        }
    };
}

base_unit_struct!(Money);
base_unit_struct!(MoneyPerTonne);
base_unit_struct!(MoneyPerMWh);
base_unit_struct!(MoneyPerMMBtu);
