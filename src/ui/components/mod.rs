mod command_input;
mod confirm;
mod input;
mod key_result;
mod modal;
mod otp_boxes;
mod paged_table;
mod toast;

pub use command_input::{CommandEvent, CommandInput};
pub use confirm::{ConfirmDialog, ConfirmEvent};
pub use input::{InputResult, TextInput};
pub use key_result::KeyResult;
pub use modal::{draw_modal, field_line};
pub use otp_boxes::draw_otp_boxes;
pub use paged_table::PagedTable;
pub use toast::Toast;
