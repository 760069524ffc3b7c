//! Host readback of the survivor list.
//!
//! Storage buffers are not host-mappable, so the aux buffer is copied
//! into a `MAP_READ` staging buffer, the device is polled to completion,
//! and the staging buffer is mapped. The single poll also fences all
//! earlier submissions: by the time the mapping resolves, every round of
//! the run has executed.

use crate::trim::TrimResult;
use crate::trim::schedule::Side;

use super::device::GpuDevice;
use super::TrimError;

/// Copy `words` u32s from the front of `source` and map them on the host.
async fn read_words(
    device: &GpuDevice,
    source: &wgpu::Buffer,
    words: u32,
) -> Result<Vec<u32>, TrimError> {
    let size = u64::from(words) * 4;

    device
        .device()
        .push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let staging = device.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("survivor staging"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    if let Some(error) = device.device().pop_error_scope().await {
        return Err(TrimError::Allocation {
            region: "staging",
            bytes: size,
            detail: error.to_string(),
        });
    }

    let mut encoder = device
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("survivor readback encoder"),
        });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
    device.queue().submit(Some(encoder.finish()));

    let buffer_slice = staging.slice(..);
    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();

    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    device.device().poll(wgpu::Maintain::Wait);
    rx.receive()
        .await
        .ok_or_else(|| TrimError::Map("map callback dropped".to_string()))?
        .map_err(|e| TrimError::Map(e.to_string()))?;

    let data = buffer_slice.get_mapped_range();
    let result: Vec<u32> = bytemuck::cast_slice(&data).to_vec();
    drop(data);
    staging.unmap();

    Ok(result)
}

/// Read the survivor list out of the aux buffer for `side`.
///
/// Word 0 is the kernel's append counter. Appends past capacity bump the
/// counter but drop the index, so the reported count is clamped to the
/// `aux_words - 1` slots that actually hold data.
pub(crate) async fn read_survivors(
    device: &GpuDevice,
    aux: &wgpu::Buffer,
    aux_words: u32,
    side: Side,
) -> Result<TrimResult, TrimError> {
    let words = read_words(device, aux, aux_words).await?;
    let reported = words[0];
    let count = reported.min(aux_words - 1);
    let survivors = words[1..=count as usize].to_vec();

    Ok(TrimResult {
        count,
        survivors,
        side,
    })
}
