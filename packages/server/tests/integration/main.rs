mod application;
mod attachment;
mod common;
mod notification;
mod service;
