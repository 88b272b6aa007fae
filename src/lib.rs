//! AstralOS console kernel.
//!
//! The console core (`vga_buffer`, `keyboard`, `simple_string`, `shell`,
//! `console`) is plain `core` code and builds anywhere. The platform
//! modules that touch ports, descriptor tables and the UART only exist on
//! the bare-metal target.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_os = "none", feature(abi_x86_interrupt))]

pub mod console;
pub mod keyboard;
pub mod shell;
pub mod simple_string;
pub mod vga_buffer;

#[cfg(target_os = "none")]
pub mod exceptions;
#[cfg(target_os = "none")]
pub mod gdt;
#[cfg(target_os = "none")]
pub mod interrupts;
#[cfg(target_os = "none")]
pub mod logger;
#[cfg(target_os = "none")]
pub mod panic_print;
#[cfg(target_os = "none")]
pub mod serial;
