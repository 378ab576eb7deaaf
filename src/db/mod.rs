pub mod chatdb;
pub mod db;
pub mod disputedb;
pub mod notificationdb;
pub mod orderdb;
pub mod paymentdb;
pub mod reviewdb;
pub mod servicedb;
pub mod techniciandb;
pub mod userdb;

pub use chatdb::ChatExt;
pub use db::DBClient;
pub use disputedb::DisputeExt;
pub use notificationdb::NotificationExt;
pub use orderdb::OrderExt;
pub use paymentdb::PaymentExt;
pub use reviewdb::ReviewExt;
pub use servicedb::ServiceExt;
pub use techniciandb::TechnicianExt;
pub use userdb::UserExt;
