mod data_table_view;
mod filter_panel;
mod header_bar;
mod input;
mod multi_select;
mod status_bar;

pub use data_table_view::DataTableView;
pub use filter_panel::{FilterField, FilterPanel, FilterPanelAction};
pub use header_bar::{HeaderBar, HeaderBarStyle, NAV_ROUTES};
pub use input::TextInput;
pub use multi_select::{MultiSelect, MultiSelectState};
pub use status_bar::{StatusBar, StatusLevel};
