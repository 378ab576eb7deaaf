pub mod chatdtos;
pub mod disputedtos;
pub mod notificationdtos;
pub mod orderdtos;
pub mod paymentdtos;
pub mod reviewdtos;
pub mod servicedtos;
pub mod techniciandtos;
pub mod userdtos;
