#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod kernel {
    use astral_kernel::console::{self, Hardware};
    use astral_kernel::interrupts::{self, PortHardware};
    use astral_kernel::{gdt, logger, panic_print, serial, shell};
    use bootloader::{BootInfo, entry_point};
    use core::panic::PanicInfo;

    entry_point!(kernel_main);

    fn kernel_main(_boot_info: &'static BootInfo) -> ! {
        // GDT/TSS first so the IDT can reference valid selectors and the IST.
        gdt::init();
        serial::init();
        logger::init(logger::LOG_LEVEL);
        log::info!("AstralOs v{} booting", shell::VERSION);

        console::init();
        console::with_console(|console| {
            console.boot();
            PortHardware.move_cursor(console.display().cursor_cell());
        });

        interrupts::init();
        x86_64::instructions::interrupts::enable();
        log::info!("keyboard interrupts enabled");

        loop {
            x86_64::instructions::hlt();
        }
    }

    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        panic_print::print(info);
        loop {
            x86_64::instructions::hlt();
        }
    }
}

/// Hosted runner: types each argument as a command line into a console
/// backed by ordinary memory and prints the resulting screen.
#[cfg(not(target_os = "none"))]
fn main() {
    use astral_kernel::console::Console;
    use astral_kernel::keyboard::{ENTER_KEY_CODE, scancode_for};
    use astral_kernel::vga_buffer::{BUFFER_HEIGHT, Buffer};

    let mut buffer = Buffer::blank();
    let mut console = Console::new(&mut buffer);
    console.boot();

    for line in std::env::args().skip(1) {
        for byte in line.bytes() {
            match scancode_for(byte) {
                Some(code) => {
                    console.handle_scancode(code);
                }
                None => eprintln!("no key for {:?}, skipped", byte as char),
            }
        }
        console.handle_scancode(ENTER_KEY_CODE);
    }

    for row in 0..BUFFER_HEIGHT {
        let text = console.display().buffer().row_text(row);
        println!("{}", String::from_utf8_lossy(&text).trim_end());
    }
}
