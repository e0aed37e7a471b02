//! String conversion of individual field values.
//!
//! # Design
//! Each supported kind implements [`ParamValue`]: text passes through, booleans
//! render as `true`/`false`, integers as base-10 digits, floats with six
//! decimals and complex numbers as `(re+imi)`. Smart pointers and references
//! delegate to their target, so any depth of indirection is transparent.
//!
//! Collections have no string form. They implement the trait too, but always
//! return [`ValueError::Unsupported`] so the marshaler can report them per
//! field instead of failing the whole record on the first one.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

/// A field value that could not be converted to a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("unsupported type {type_name}")]
    Unsupported { type_name: &'static str },
}

impl ValueError {
    fn unsupported<T: ?Sized>() -> Self {
        ValueError::Unsupported {
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// Conversion of a field value into its form-encoded string representation.
pub trait ParamValue {
    fn to_param(&self) -> Result<String, ValueError>;
}

/// A complex number, rendered as `(re+imi)` with six decimals per component.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Complex<F> {
    pub re: F,
    pub im: F,
}

impl<F> Complex<F> {
    pub fn new(re: F, im: F) -> Self {
        Self { re, im }
    }
}

impl ParamValue for str {
    fn to_param(&self) -> Result<String, ValueError> {
        Ok(self.to_string())
    }
}

impl ParamValue for String {
    fn to_param(&self) -> Result<String, ValueError> {
        Ok(self.clone())
    }
}

impl ParamValue for Cow<'_, str> {
    fn to_param(&self) -> Result<String, ValueError> {
        Ok(self.to_string())
    }
}

impl ParamValue for char {
    fn to_param(&self) -> Result<String, ValueError> {
        Ok(self.to_string())
    }
}

impl ParamValue for bool {
    fn to_param(&self) -> Result<String, ValueError> {
        Ok(if *self { "true" } else { "false" }.to_string())
    }
}

macro_rules! integer_param {
    ($($ty:ty),*) => {
        $(
            impl ParamValue for $ty {
                fn to_param(&self) -> Result<String, ValueError> {
                    Ok(self.to_string())
                }
            }
        )*
    };
}

integer_param!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_param {
    ($($ty:ty),*) => {
        $(
            impl ParamValue for $ty {
                fn to_param(&self) -> Result<String, ValueError> {
                    Ok(format!("{self:.6}"))
                }
            }

            impl ParamValue for Complex<$ty> {
                fn to_param(&self) -> Result<String, ValueError> {
                    Ok(format!("({:.6}{:+.6}i)", self.re, self.im))
                }
            }
        )*
    };
}

float_param!(f32, f64);

impl<T: ParamValue + ?Sized> ParamValue for &T {
    fn to_param(&self) -> Result<String, ValueError> {
        (**self).to_param()
    }
}

impl<T: ParamValue + ?Sized> ParamValue for &mut T {
    fn to_param(&self) -> Result<String, ValueError> {
        (**self).to_param()
    }
}

impl<T: ParamValue + ?Sized> ParamValue for Box<T> {
    fn to_param(&self) -> Result<String, ValueError> {
        (**self).to_param()
    }
}

impl<T: ParamValue + ?Sized> ParamValue for Rc<T> {
    fn to_param(&self) -> Result<String, ValueError> {
        (**self).to_param()
    }
}

impl<T: ParamValue + ?Sized> ParamValue for Arc<T> {
    fn to_param(&self) -> Result<String, ValueError> {
        (**self).to_param()
    }
}

/// `None` converts to the empty string, so `omitempty` drops it.
impl<T: ParamValue> ParamValue for Option<T> {
    fn to_param(&self) -> Result<String, ValueError> {
        match self {
            Some(value) => value.to_param(),
            None => Ok(String::new()),
        }
    }
}

impl<T> ParamValue for [T] {
    fn to_param(&self) -> Result<String, ValueError> {
        Err(ValueError::unsupported::<Self>())
    }
}

impl<T> ParamValue for Vec<T> {
    fn to_param(&self) -> Result<String, ValueError> {
        Err(ValueError::unsupported::<Self>())
    }
}

impl<K, V, S> ParamValue for HashMap<K, V, S> {
    fn to_param(&self) -> Result<String, ValueError> {
        Err(ValueError::unsupported::<Self>())
    }
}

impl<K, V> ParamValue for BTreeMap<K, V> {
    fn to_param(&self) -> Result<String, ValueError> {
        Err(ValueError::unsupported::<Self>())
    }
}

impl ParamValue for () {
    fn to_param(&self) -> Result<String, ValueError> {
        Err(ValueError::unsupported::<Self>())
    }
}
