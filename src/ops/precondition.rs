//! Build preconditions checked before anything touches the disk or network.

use crate::core::host::{HostDescriptor, Precision};
use crate::core::package::PackageDescriptor;
use crate::error::{InstallError, InstallResult};

/// Verify that `package` can be built against `host`.
///
/// The first violated condition is reported.
pub fn check_preconditions(package: &PackageDescriptor, host: &HostDescriptor) -> InstallResult<()> {
    let pkg = package.macro_name();
    let petsc = &host.petsc;

    if !petsc.cxx11 {
        return Err(InstallError::Precondition(format!("{} requires C++11.", pkg)));
    }
    if !petsc.shared_libraries {
        return Err(InstallError::Precondition(format!(
            "{} requires a shared library build.",
            pkg
        )));
    }
    if petsc.hpddm {
        // Both copies would define the same KSP/PC symbols
        return Err(InstallError::Precondition(format!(
            "{} requires PETSc to be built without {}.",
            pkg, pkg
        )));
    }

    check_capabilities(package, host)
}

fn check_capabilities(package: &PackageDescriptor, host: &HostDescriptor) -> InstallResult<()> {
    let pkg = package.macro_name();
    let precision = host.petsc.precision;

    let supported = match precision {
        Precision::Single => package.supports_single,
        Precision::Double => true,
        Precision::Quad => package.supports_quad,
    };
    if !supported {
        return Err(InstallError::Precondition(format!(
            "{} does not support {} precision.",
            pkg, precision
        )));
    }

    if host.petsc.index_64bit && !package.supports_64bit_indices {
        return Err(InstallError::Precondition(format!(
            "{} cannot be used with 64-bit integers.",
            pkg
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::{BaseLibrary, HostProject};

    fn host() -> HostDescriptor {
        HostDescriptor::new(
            BaseLibrary::new("/opt/petsc", "arch-opt", "c++"),
            HostProject::new("/opt/slepc"),
        )
    }

    fn message(host: &HostDescriptor) -> String {
        check_preconditions(&PackageDescriptor::hpddm(), host)
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_default_host_passes() {
        assert!(check_preconditions(&PackageDescriptor::hpddm(), &host()).is_ok());
    }

    #[test]
    fn test_requires_cxx11() {
        let mut h = host();
        h.petsc.cxx11 = false;
        assert_eq!(message(&h), "HPDDM requires C++11.");
    }

    #[test]
    fn test_requires_shared_libraries() {
        let mut h = host();
        h.petsc.shared_libraries = false;
        assert_eq!(message(&h), "HPDDM requires a shared library build.");
    }

    #[test]
    fn test_rejects_petsc_with_hpddm() {
        let mut h = host();
        h.petsc.hpddm = true;
        assert_eq!(message(&h), "HPDDM requires PETSc to be built without HPDDM.");
    }

    #[test]
    fn test_precision_capabilities() {
        let mut h = host();
        h.petsc.precision = Precision::Single;
        assert!(check_preconditions(&PackageDescriptor::hpddm(), &h).is_ok());

        h.petsc.precision = Precision::Quad;
        assert_eq!(message(&h), "HPDDM does not support __float128 precision.");
    }

    #[test]
    fn test_64bit_indices() {
        let mut h = host();
        h.petsc.index_64bit = true;
        assert!(check_preconditions(&PackageDescriptor::hpddm(), &h).is_ok());

        let mut pkg = PackageDescriptor::hpddm();
        pkg.supports_64bit_indices = false;
        let err = check_preconditions(&pkg, &h).unwrap_err();
        assert_eq!(err.to_string(), "HPDDM cannot be used with 64-bit integers.");
    }
}
