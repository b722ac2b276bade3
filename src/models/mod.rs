pub mod category;
pub mod message;
pub mod topic;
pub mod user;

pub use category::{Entity as Category, Model as CategoryModel};
pub use message::{Entity as Message, MessageWithUser, Model as MessageModel};
pub use topic::{Entity as Topic, Model as TopicModel, TopicWithUserCategory};
pub use user::{Entity as User, Model as UserModel};
