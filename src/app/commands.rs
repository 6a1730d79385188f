//! Inbound commands to the application service.
//!
//! These represent actions requested from outside the control tick (MQTT
//! tuning messages) or confirmed in the button menu, which the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::messaging::InboundMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Raw tuning message drained from the MQTT inbound queue.
    Tuning(InboundMessage),

    /// New UTC offset in seconds (menu "Set Time Zone").
    SetUtcOffset(i32),

    /// Arm alarm `index` for `hour:minute` (menu "Set Alarms").
    ConfigureAlarm { index: usize, hour: u8, minute: u8 },

    /// Disarm alarm `index` (menu "Delete Alarm").
    DeleteAlarm(usize),
}
