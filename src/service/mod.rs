pub mod background_jobs;
pub mod dispute;
pub mod error;
pub mod escrow;
pub mod notification;
pub mod order;
pub mod payment;
pub mod paymob;
pub mod review;
