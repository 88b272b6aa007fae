//! Fatal CPU exception handlers.
//!
//! Each one reports on the screen and on COM1, then halts for good; none of
//! them returns to the faulting instruction.

use x86_64::registers::control::Cr2;
use x86_64::structures::idt::InterruptStackFrame;

use crate::{println, serial};

fn halt_forever() -> ! {
    loop {
        x86_64::instructions::hlt();
    }
}

/// Runs on its own IST stack so a kernel stack overflow still reports.
pub extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    log::error!("double fault at {:#x}", stack_frame.instruction_pointer.as_u64());
    serial::write_str("EXCEPTION: DOUBLE FAULT\n");
    println!("EXCEPTION: DOUBLE FAULT\n{:#?}", stack_frame);
    halt_forever()
}

pub extern "x86-interrupt" fn gpf_handler(stack_frame: InterruptStackFrame, error_code: u64) {
    log::error!("general protection fault, ec={:#x}", error_code);
    serial::write_str("EXCEPTION: GENERAL PROTECTION FAULT\n");
    println!(
        "EXCEPTION: GENERAL PROTECTION FAULT, ec={:#x}\n{:#?}",
        error_code, stack_frame
    );
    halt_forever()
}

pub extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    let addr = Cr2::read_raw();
    let present = (error_code & 1) != 0;
    let write = (error_code & (1 << 1)) != 0;
    let user = (error_code & (1 << 2)) != 0;

    log::error!("page fault @ {:#x}, ec={:#x}", addr, error_code);
    serial::write_str("EXCEPTION: PAGE FAULT\n");
    println!(
        "EXCEPTION: PAGE FAULT @ {:#x}, ec={:#x} P={} WR={} US={}\n{:#?}",
        addr, error_code, present, write, user, stack_frame
    );
    halt_forever()
}
