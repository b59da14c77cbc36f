// Outbound email relay — trait-based so the transport can be swapped.
//
// The EmailRelay trait is what the contact form talks to. EmailJsRelay is the
// production implementation; tests plug in their own.

pub mod emailjs;
pub mod traits;
