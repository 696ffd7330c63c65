use antenna_controller::{
    AntennaController, Axis, SerialLine, WireCommand, serial::SerialAntennaController,
};
use std::io::{BufRead, BufReader, Write};
use std::thread;
use std::time::Duration;

/*
 * Before running this example, use the command in the terminal:
 *
 * socat -d -d pty,raw,echo=0 pty,raw,echo=0
 *
 * to create two virtual ports. The first one plays the bridge, the second one
 * plays the rotator firmware answering with a feedback line.
 */

fn main() {
    let bridge_port = "/dev/pts/2".to_string();
    let rotator_port = "/dev/pts/3".to_string();
    let baud_rate = 9600;

    let rotator = thread::spawn(move || {
        let controller = SerialAntennaController::new(&rotator_port, baud_rate)
            .expect("Failed to open serial port (rotator)");

        let mut reader = BufReader::new(controller.port);
        let mut command = Vec::new();
        reader
            .read_until(b'\r', &mut command)
            .expect("Failed to read command");

        println!("Rotator: received {:?}", String::from_utf8_lossy(&command));

        reader
            .get_mut()
            .write_all(b"A=45.0 S=0 M\n")
            .expect("Failed to answer");
    });

    let mut controller = SerialAntennaController::new(&bridge_port, baud_rate)
        .expect("Failed to open serial port (bridge)");

    controller
        .send(&WireCommand::new(Axis::Azimuth, 45.0))
        .expect("Failed to send command");

    thread::sleep(Duration::from_millis(500));

    let mut reader = BufReader::new(controller.reader().expect("Failed to clone port"));
    let mut line = String::new();

    match reader.read_line(&mut line) {
        Ok(n) if n > 0 => println!("Bridge: {:?}", SerialLine::parse(&line)),
        Ok(_) => println!("Bridge: No feedback received"),
        Err(e) => println!("Bridge: Failed to read line: {}", e),
    }

    rotator.join().unwrap();
}
