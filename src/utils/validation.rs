use validator::Validate;

use crate::error::Result;

/// Runs `validator` rules and hands the value back on success.
pub fn validated<T: Validate>(val: T) -> Result<T> {
    val.validate()?;
    Ok(val)
}
