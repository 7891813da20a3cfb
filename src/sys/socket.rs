use std::io;
use std::mem;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::os::unix::io::RawFd;

use libc::{self, c_int, c_void};

fn v4_sockaddr(ip: Ipv4Addr, port: u16) -> libc::sockaddr_in {
    let mut addr: libc::sockaddr_in = unsafe { mem::zeroed() };
    addr.sin_family = libc::AF_INET as libc::sa_family_t;
    addr.sin_port = port.to_be();
    addr.sin_addr = libc::in_addr {
        s_addr: u32::from_ne_bytes(ip.octets()),
    };
    addr
}

fn bind_v4(fd: RawFd, ip: Ipv4Addr, port: u16) -> io::Result<()> {
    let addr = v4_sockaddr(ip, port);

    syscall!(bind(
        fd,
        &addr as *const libc::sockaddr_in as *const libc::sockaddr,
        mem::size_of::<libc::sockaddr_in>() as libc::socklen_t
    ))?;

    Ok(())
}

/// Creates a non-blocking IPv4 listening socket with `SO_REUSEADDR` set.
pub fn tcp_listener(ip: Ipv4Addr, port: u16, backlog: c_int) -> io::Result<RawFd> {
    let fd = syscall!(socket(
        libc::AF_INET,
        libc::SOCK_STREAM | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
        0
    ))?;

    let on: c_int = 1;
    let res = syscall!(setsockopt(
        fd,
        libc::SOL_SOCKET,
        libc::SO_REUSEADDR,
        &on as *const c_int as *const c_void,
        mem::size_of::<c_int>() as libc::socklen_t
    ))
    .and_then(|_| bind_v4(fd, ip, port))
    .and_then(|_| syscall!(listen(fd, backlog)).map(|_| ()));

    if let Err(e) = res {
        close(fd);
        return Err(e);
    }

    Ok(fd)
}

/// Creates a non-blocking IPv4 datagram socket bound to `ip:port`.
pub fn udp_listener(ip: Ipv4Addr, port: u16) -> io::Result<RawFd> {
    let fd = syscall!(socket(
        libc::AF_INET,
        libc::SOCK_DGRAM | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
        0
    ))?;

    if let Err(e) = bind_v4(fd, ip, port) {
        close(fd);
        return Err(e);
    }

    Ok(fd)
}

/// Accepts one connection; the returned socket is already non-blocking.
pub fn accept(fd: RawFd) -> io::Result<RawFd> {
    syscall!(accept4(
        fd,
        std::ptr::null_mut(),
        std::ptr::null_mut(),
        libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC
    ))
}

pub fn recv(fd: RawFd, buf: &mut [u8]) -> io::Result<usize> {
    let n = syscall!(recv(fd, buf.as_mut_ptr() as *mut c_void, buf.len(), 0))?;
    Ok(n as usize)
}

/// `MSG_NOSIGNAL` so a torn-down peer surfaces as `EPIPE` instead of
/// killing the process.
pub fn send(fd: RawFd, buf: &[u8]) -> io::Result<usize> {
    let n = syscall!(send(
        fd,
        buf.as_ptr() as *const c_void,
        buf.len(),
        libc::MSG_NOSIGNAL
    ))?;
    Ok(n as usize)
}

pub fn recv_from(fd: RawFd, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
    let mut storage: libc::sockaddr_in = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;

    let n = syscall!(recvfrom(
        fd,
        buf.as_mut_ptr() as *mut c_void,
        buf.len(),
        0,
        &mut storage as *mut libc::sockaddr_in as *mut libc::sockaddr,
        &mut len
    ))?;

    let ip = Ipv4Addr::from(u32::from_be(storage.sin_addr.s_addr));
    let port = u16::from_be(storage.sin_port);

    Ok((n as usize, SocketAddr::V4(SocketAddrV4::new(ip, port))))
}

pub fn close(fd: RawFd) {
    unsafe {
        let _ = libc::close(fd);
    }
}
