use std::{
    net::{SocketAddr, UdpSocket},
    thread,
};

use crossbeam_channel::Receiver;

pub fn listen() -> (SocketAddr, Receiver<Vec<u8>>) {
    let sock = UdpSocket::bind("127.0.0.1:0").expect("failed to bind socket");
    let addr = sock.local_addr().expect("missing local addr");

    let (tx, rx) = crossbeam_channel::unbounded();

    thread::spawn(move || {
        let mut buf = vec![0; u16::max_value() as usize];

        loop {
            let (len, _) = sock.recv_from(&mut buf).expect("failed to receive");

            if tx.send(buf[..len].to_vec()).is_err() {
                return;
            }
        }
    });

    (addr, rx)
}
