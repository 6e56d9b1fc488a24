use simplelink_jtag::cable::bitbang::{BitbangCable, StdDelay};
use simplelink_jtag::cable::simplelink::SimpleLink;
use simplelink_jtag::cable::Cable;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let mut link = SimpleLink::new();
    if !args.is_empty() {
        if let Err(e) = link.configure(&args) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
    link.start().expect("start");

    let lines = link.bitbang().expect("mapped");
    let mut cable = BitbangCable::new(1000, lines, StdDelay);
    cable.reset_tap(false);

    // Test-Logic-Reset, Run-Test/Idle, then Shift-DR.  IDCODE is selected after reset.
    cable.change_mode(&[1, 1, 1, 1, 1, 0], true);
    cable.change_mode(&[1, 0, 0], true);
    let bits = cable.read_data(32);
    let idcode = u32::from_le_bytes(bits.try_into().expect("idcode"));
    println!("idcode: {:08x}", idcode);

    link.stop();
}
