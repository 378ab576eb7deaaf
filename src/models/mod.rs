pub mod chatmodel;
pub mod disputemodel;
pub mod notificationmodel;
pub mod ordermodel;
pub mod paymentmodel;
pub mod reviewmodel;
pub mod servicemodel;
pub mod technicianmodel;
pub mod usermodel;
