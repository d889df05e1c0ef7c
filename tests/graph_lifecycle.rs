//! Integration tests covering the full `RenderGraph` lifecycle against a real
//! headless device: `new -> reset -> add_pass -> compile -> execute ->
//! post_compile`. These need a live Vulkan ICD (there is no synthetic device),
//! so they complement rather than replace the no-GPU barrier-synthesis
//! scenario tests in `src/graph/compiler.rs` and the key-partitioning test in
//! `src/resource/pool.rs`, which cover the same end-to-end scenarios without
//! needing a device at all.

mod framework;

use anyhow::Result;
use janus::prelude::*;

fn command_recorder(device: &Device) -> Result<(CommandPool, CommandRecorder)> {
    let pool = CommandPool::new(device.clone(), device.queue_family_index(), vk::CommandPoolCreateFlags::empty())?;
    let buffer = pool.allocate_command_buffer()?;
    let recorder = CommandRecorder::new(device.clone(), buffer);
    Ok((pool, recorder))
}

/// The lifecycle SPEC_FULL.md promises: `new -> reset -> add_pass -> compile
/// -> execute -> post_compile`, with a single pass writing one color
/// attachment.
#[test]
fn full_lifecycle_compiles_and_executes_a_single_pass() -> Result<()> {
    let ctx = framework::make_context()?;
    let device = ctx.device.clone();
    let mut graph = RenderGraph::new(ctx.device.clone(), ctx.allocator);

    graph.reset();
    graph.add_pass(
        "clear_scene_color",
        |_: &mut (), builder: &mut Builder| {
            let color = builder.create_texture("SceneColor", TextureDesc::new(64, 64, vk::Format::R8G8B8A8_UNORM)).unwrap();
            builder.write_color(color, AttachmentInfo::clear_color([0.0; 4]));
        },
        (),
        |_, _, _| Ok(()),
    );

    graph.compile(0)?;
    let (_pool, mut recorder) = command_recorder(&device)?;
    graph.execute(&mut recorder)?;

    let debug_images = graph.post_compile();
    assert_eq!(debug_images.len(), 1);
    assert_eq!(debug_images[0].0, "SceneColor");
    assert_eq!(debug_images[0].1.layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

    ctx.device.wait_idle()?;
    Ok(())
}

/// Scenario: picking read-back. Pass A writes `PickID` as a color attachment;
/// pass B declares a transfer read and copies it to a host-visible buffer.
#[test]
fn scenario_picking_readback_copies_from_color_attachment() -> Result<()> {
    let ctx = framework::make_context()?;
    let device = ctx.device.clone();
    let mut graph = RenderGraph::new(ctx.device.clone(), ctx.allocator);

    graph.reset();
    graph.add_pass(
        "gbuffer",
        |_: &mut (), builder: &mut Builder| {
            let pick_id = builder.create_texture("PickID", TextureDesc::new(64, 64, vk::Format::R32_UINT)).unwrap();
            builder.write_color(pick_id, AttachmentInfo::clear_color([0.0; 4]));
        },
        (),
        |_, _, _| Ok(()),
    );
    graph.add_pass(
        "pick_readback",
        |_: &mut (), builder: &mut Builder| {
            let pick_id = builder.create_texture("PickID", TextureDesc::new(64, 64, vk::Format::R32_UINT)).unwrap();
            builder.read(pick_id, Some(vk::PipelineStageFlags2::TRANSFER), Some(vk::AccessFlags2::TRANSFER_READ));
        },
        (),
        |_, _, _| Ok(()),
    );

    graph.compile(0)?;
    let (_pool, mut recorder) = command_recorder(&device)?;
    graph.execute(&mut recorder)?;

    let debug_images = graph.post_compile();
    let pick_id = debug_images.iter().find(|(name, _)| name == "PickID").unwrap();
    assert_eq!(pick_id.1.layout, vk::ImageLayout::TRANSFER_SRC_OPTIMAL);

    ctx.device.wait_idle()?;
    Ok(())
}

/// Scenario: outline overlay. Pass A writes `PickID`; pass B samples it in the
/// fragment shader while also writing `Backbuffer`.
#[test]
fn scenario_outline_overlay_samples_pick_id_into_backbuffer() -> Result<()> {
    let ctx = framework::make_context()?;
    let device = ctx.device.clone();
    let mut graph = RenderGraph::new(ctx.device.clone(), ctx.allocator);

    graph.reset();
    graph.add_pass(
        "gbuffer",
        |_: &mut (), builder: &mut Builder| {
            let pick_id = builder.create_texture("PickID", TextureDesc::new(64, 64, vk::Format::R32_UINT)).unwrap();
            builder.write_color(pick_id, AttachmentInfo::clear_color([0.0; 4]));
        },
        (),
        |_, _, _| Ok(()),
    );
    graph.add_pass(
        "outline",
        |_: &mut (), builder: &mut Builder| {
            let pick_id = builder.create_texture("PickID", TextureDesc::new(64, 64, vk::Format::R32_UINT)).unwrap();
            builder.read(pick_id, Some(vk::PipelineStageFlags2::FRAGMENT_SHADER), Some(vk::AccessFlags2::SHADER_SAMPLED_READ));
            let backbuffer = builder.create_texture("Backbuffer", TextureDesc::new(64, 64, vk::Format::R8G8B8A8_UNORM)).unwrap();
            builder.write_color(backbuffer, AttachmentInfo::clear_color([0.0; 4]));
        },
        (),
        |_, _, _| Ok(()),
    );

    graph.compile(0)?;
    let (_pool, mut recorder) = command_recorder(&device)?;
    graph.execute(&mut recorder)?;

    let debug_images = graph.post_compile();
    let pick_id = debug_images.iter().find(|(name, _)| name == "PickID").unwrap();
    assert_eq!(pick_id.1.layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
    let backbuffer = debug_images.iter().find(|(name, _)| name == "Backbuffer").unwrap();
    assert_eq!(backbuffer.1.layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

    ctx.device.wait_idle()?;
    Ok(())
}

/// Scenario: resource aliasing across frames. A transient declared in frame k
/// and a differently-named transient with an identical descriptor declared in
/// frame k+1 (same slot, after `reset`) share the same pooled physical
/// resource; no extra allocation happens.
#[test]
fn scenario_resource_aliasing_reuses_pooled_backing_across_frames() -> Result<()> {
    let ctx = framework::make_context()?;
    let mut graph = RenderGraph::new(ctx.device.clone(), ctx.allocator);

    let desc = || TextureDesc::new(960, 540, vk::Format::R16G16B16A16_SFLOAT).with_usage(vk::ImageUsageFlags::STORAGE);

    graph.reset();
    graph.add_pass(
        "bloom_h",
        |_: &mut (), builder: &mut Builder| {
            let bloom = builder.create_texture("BloomH", desc()).unwrap();
            builder.write(bloom, Some(vk::PipelineStageFlags2::COMPUTE_SHADER), Some(vk::AccessFlags2::SHADER_STORAGE_WRITE));
        },
        (),
        |_, _, _| Ok(()),
    );
    graph.compile(0)?;
    let frame_k_images = graph.post_compile();
    let bloom_h = frame_k_images.iter().find(|(name, _)| name == "BloomH").unwrap().1.image;

    graph.reset();
    graph.add_pass(
        "blur_h",
        |_: &mut (), builder: &mut Builder| {
            let blur = builder.create_texture("BlurH", desc()).unwrap();
            builder.write(blur, Some(vk::PipelineStageFlags2::COMPUTE_SHADER), Some(vk::AccessFlags2::SHADER_STORAGE_WRITE));
        },
        (),
        |_, _, _| Ok(()),
    );
    graph.compile(0)?;
    let frame_k1_images = graph.post_compile();
    let blur_h = frame_k1_images.iter().find(|(name, _)| name == "BlurH").unwrap().1.image;

    assert_eq!(bloom_h, blur_h, "a transient reused across frames with an identical descriptor must alias the same physical image");

    ctx.device.wait_idle()?;
    Ok(())
}

/// Scenario: idempotent re-create. Two passes both call
/// `create_texture("ShadowAtlas", ...)`; both receive the same handle and only
/// one physical resource backs it, with the second pass able to load it.
#[test]
fn scenario_idempotent_recreate_shares_one_physical_resource() -> Result<()> {
    let ctx = framework::make_context()?;
    let device = ctx.device.clone();
    let mut graph = RenderGraph::new(ctx.device.clone(), ctx.allocator);

    graph.reset();
    graph.add_pass(
        "shadow_pass_a",
        |_: &mut (), builder: &mut Builder| {
            let atlas = builder
                .create_texture("ShadowAtlas", TextureDesc::new(2048, 2048, vk::Format::D32_SFLOAT))
                .unwrap();
            builder.write_depth(atlas, AttachmentInfo::clear_depth(1.0, 0));
        },
        (),
        |_, _, _| Ok(()),
    );
    graph.add_pass(
        "shadow_pass_b",
        |_: &mut (), builder: &mut Builder| {
            let atlas = builder
                .create_texture("ShadowAtlas", TextureDesc::new(2048, 2048, vk::Format::D32_SFLOAT))
                .unwrap();
            builder.write_depth(atlas, AttachmentInfo::load());
        },
        (),
        |_, _, _| Ok(()),
    );

    assert_eq!(graph.node_count(), 1, "re-creating with an identical descriptor must not add a second node");

    graph.compile(0)?;
    let (_pool, mut recorder) = command_recorder(&device)?;
    graph.execute(&mut recorder)?;

    let debug_images = graph.post_compile();
    assert_eq!(debug_images.len(), 1);

    ctx.device.wait_idle()?;
    Ok(())
}
