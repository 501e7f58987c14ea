pub mod color;
pub mod confirm_delete;
pub mod entry_list;
pub mod filters_box;
pub mod help;
pub mod kind_picker;
pub mod line_input;
pub mod status_bar;
pub mod tabs;
