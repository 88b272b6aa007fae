//! GDT with a kernel code segment and a TSS carrying the double-fault stack.

use x86_64::VirtAddr;
use x86_64::instructions::segmentation::{CS, Segment};
use x86_64::instructions::tables::load_tss;
use x86_64::structures::gdt::{Descriptor, GlobalDescriptorTable};
use x86_64::structures::tss::TaskStateSegment;

pub const DOUBLE_FAULT_IST_INDEX: u16 = 0;
/// IST numbering in an IDT gate is 1-based.
pub const DOUBLE_FAULT_IST_INDEX_FOR_IDT: u16 = DOUBLE_FAULT_IST_INDEX + 1;

const DOUBLE_FAULT_STACK_SIZE: usize = 4096 * 5;

static mut DOUBLE_FAULT_STACK: [u8; DOUBLE_FAULT_STACK_SIZE] = [0; DOUBLE_FAULT_STACK_SIZE];
static mut TSS: TaskStateSegment = TaskStateSegment::new();
static mut GDT: GlobalDescriptorTable = GlobalDescriptorTable::new();

/// Build and load the GDT, reload CS and load the TSS. Call once, early.
pub fn init() {
    // SAFETY: runs once on the boot path before interrupts are enabled, so
    // nothing else observes these statics while they are being filled in.
    unsafe {
        let stack_start = VirtAddr::from_ptr(&raw const DOUBLE_FAULT_STACK);
        let stack_end = stack_start + DOUBLE_FAULT_STACK_SIZE as u64;
        let tss = &mut *(&raw mut TSS);
        tss.interrupt_stack_table[DOUBLE_FAULT_IST_INDEX as usize] = stack_end;

        let gdt = &mut *(&raw mut GDT);
        let code_selector = gdt.append(Descriptor::kernel_code_segment());
        let tss_selector = gdt.append(Descriptor::tss_segment(&*(&raw const TSS)));
        (*(&raw const GDT)).load();
        CS::set_reg(code_selector);
        load_tss(tss_selector);
    }
    log::debug!("GDT and TSS loaded");
}
