use core::fmt::Write as _;
use core::panic::PanicInfo;

use crate::println;
use crate::serial::SerialPort;

/// Report a panic on COM1 and the screen. Call from `#[panic_handler]`.
pub fn print(info: &PanicInfo) {
    x86_64::instructions::interrupts::disable();

    match info.location() {
        Some(loc) => {
            let _ = writeln!(
                SerialPort,
                "KERNEL PANIC at {}:{}:{}: {}",
                loc.file(),
                loc.line(),
                loc.column(),
                info.message()
            );
            println!(
                "\nKERNEL PANIC at {}:{}:{}",
                loc.file(),
                loc.line(),
                loc.column()
            );
        }
        None => {
            let _ = writeln!(SerialPort, "KERNEL PANIC: {}", info.message());
            println!("\nKERNEL PANIC at <unknown location>");
        }
    }
    println!("message: {}", info.message());
}
