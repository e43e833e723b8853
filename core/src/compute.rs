//! The compute back-end abstraction: a capability set a device exposes so the
//! generator and lookup pipelines can target OpenCL, Vulkan compute, CUDA, or
//! plain CPU threads without changing their own code.

use rayon::prelude::*;

use crate::chain::{generate_rainbow_chain, hash_to_index, index_to_plaintext, ntlm_hash};
use crate::error::RainbowResult;
use crate::space::PlaintextSpace;

/// Parameters a kernel launch needs but that don't change per chain.
#[derive(Clone, Copy, Debug)]
pub struct KernelParams<'a> {
    pub charset: &'a [u8],
    pub space: &'a PlaintextSpace,
    pub reduction_offset: u64,
    pub total: u64,
}

/// A device able to walk partial rainbow chains in bulk.
///
/// This mirrors the `{enumerateDevices, buildKernel, launch, readBuffer}`
/// capability set a real GPU driver shim would expose: callers never touch
/// device-specific handles, only submit batches and read results back.
pub trait ComputeDevice: Send + Sync {
    fn name(&self) -> &str;

    /// The number of chains this device prefers to process per kernel
    /// launch (its work-group size), used by callers to size batches.
    fn work_group_size(&self) -> u64;

    /// Walks `starts[i]` forward through columns `[col_start, col_end)`,
    /// returning the resulting index for each input in the same order.
    ///
    /// A column `p` applies `index_to_plaintext -> ntlm_hash -> hash_to_index`
    /// once, using `p` as the reduction position.
    fn launch(
        &self,
        starts: &[u64],
        params: KernelParams<'_>,
        col_start: u64,
        col_end: u64,
    ) -> RainbowResult<Vec<u64>>;
}

/// The reference compute device: plain CPU threads via `rayon`.
///
/// Every GPU back-end is an external collaborator; this is the one device
/// this crate ships, and it is also what the verifier and precompute stages
/// use even when GPU devices are present, since both need CPU-side
/// recomputation anyway.
pub struct CpuDevice {
    work_group_size: u64,
}

impl CpuDevice {
    pub fn new() -> Self {
        Self {
            work_group_size: 1 << 16,
        }
    }

    pub fn with_work_group_size(work_group_size: u64) -> Self {
        Self { work_group_size }
    }
}

impl Default for CpuDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeDevice for CpuDevice {
    fn name(&self) -> &str {
        "cpu"
    }

    fn work_group_size(&self) -> u64 {
        self.work_group_size
    }

    fn launch(
        &self,
        starts: &[u64],
        params: KernelParams<'_>,
        col_start: u64,
        col_end: u64,
    ) -> RainbowResult<Vec<u64>> {
        let out = starts
            .par_iter()
            .map(|&start| {
                let mut i = start;
                for p in col_start..col_end {
                    let pt = index_to_plaintext(i, params.charset, params.space);
                    let h = ntlm_hash(&pt);
                    i = hash_to_index(&h, params.reduction_offset, params.total, p);
                }
                i
            })
            .collect();
        Ok(out)
    }
}

/// Enumerates the compute devices available to this process.
///
/// GPU discovery is an external collaborator's job; this always returns
/// exactly one CPU device.
pub fn enumerate_devices() -> Vec<CpuDevice> {
    vec![CpuDevice::new()]
}

/// Walks a full chain end to end using a device's `launch`, for callers that
/// already have a `ComputeDevice` in hand and want the single-chain
/// convenience that [`generate_rainbow_chain`] provides directly.
pub fn launch_full_chain(
    device: &dyn ComputeDevice,
    start: u64,
    chain_len: u64,
    params: KernelParams<'_>,
) -> RainbowResult<u64> {
    let out = device.launch(&[start], params, 0, chain_len.saturating_sub(1))?;
    Ok(out[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset;

    #[test]
    fn cpu_device_matches_direct_chain_walk() {
        let cs = charset::by_name("ascii-32-95").unwrap();
        let space = PlaintextSpace::build(cs.len() as u64, 8, 8).unwrap();
        let total = space.total();
        let params = KernelParams {
            charset: &cs,
            space: &space,
            reduction_offset: 0,
            total,
        };

        let direct = generate_rainbow_chain(456, 666, &cs, &space, 0, total);
        let device = CpuDevice::new();
        let via_device = launch_full_chain(&device, 456, 666, params).unwrap();
        assert_eq!(direct, via_device);
    }

    #[test]
    fn launch_is_order_preserving() {
        let cs = charset::by_name("numeric").unwrap();
        let space = PlaintextSpace::build(cs.len() as u64, 4, 4).unwrap();
        let total = space.total();
        let params = KernelParams {
            charset: &cs,
            space: &space,
            reduction_offset: 0,
            total,
        };
        let device = CpuDevice::new();
        let starts: Vec<u64> = (0..50).collect();
        let out = device.launch(&starts, params, 0, 3).unwrap();
        assert_eq!(starts.len(), out.len());
    }
}
