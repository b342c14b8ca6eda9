// Messaging module
// Lock-free channels between the UI, the scheduler and the audio thread

pub mod channels;
pub mod command;
pub mod notification;
pub mod sink;

pub use channels::{
    COMMAND_CAPACITY, CommandConsumer, CommandProducer, NOTIFICATION_CAPACITY,
    NotificationConsumer, NotificationProducer, create_command_channel,
    create_notification_channel,
};
pub use command::{Command, Trigger};
pub use notification::{Notification, NotificationCategory, NotificationLevel, Notifier};
pub use sink::{CollectingSink, CommandSink, NoteSink};
