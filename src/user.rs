use std::ffi::CString;
use std::io;

use crate::error::Error;
use crate::Result;

/// Switches the process to the given user, group first. Refuses to switch
/// to anything that resolves to root.
pub fn drop_to_user(name: &str) -> Result<()> {
    let cname = CString::new(name).map_err(|_| {
        Error::Privilege(io::Error::new(
            io::ErrorKind::InvalidInput,
            "user name contains a nul byte",
        ))
    })?;

    let user = unsafe { libc::getpwnam(cname.as_ptr()) };
    if user.is_null() {
        return Err(Error::Privilege(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such user: {}", name),
        )));
    }

    let (uid, gid) = unsafe { ((*user).pw_uid, (*user).pw_gid) };

    if uid == 0 || gid == 0 {
        return Err(Error::Privilege(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "cowardly refusing to run as root",
        )));
    }

    syscall!(setgid(gid)).map_err(Error::Privilege)?;
    syscall!(setuid(uid)).map_err(Error::Privilege)?;

    Ok(())
}
