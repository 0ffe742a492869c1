pub mod gdrive;
