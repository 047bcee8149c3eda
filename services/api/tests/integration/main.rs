
mod auth_test;
mod event_test;
mod registration_test;
mod reminder_test;
