pub mod edit_dialog;
