mod add;
mod helpers;
mod list;
mod stats;

pub(crate) use add::cmd_add;
pub(crate) use list::cmd_list;
pub(crate) use stats::cmd_stats;
