mod client;

pub use client::DriveClient;
