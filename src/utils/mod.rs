pub mod format_utils;
pub mod maths_utils;

pub use format_utils::{group_thousands, strip_to_numeric};
pub use maths_utils::{decimals_for_reference, relative_error, round_price, round_to_decimals};
