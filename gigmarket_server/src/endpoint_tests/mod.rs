mod helpers;
mod orders;
mod reviews;
mod webhook;
