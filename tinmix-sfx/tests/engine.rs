use tinmix_sfx::backend::null;
use tinmix_sfx::{
    CallbackStatus, EngineSettings, OutputConsumer, SfxEngine, SfxError, SfxHandle, SfxManager, SpeakerSetup,
};

fn mono(frames: usize) -> EngineSettings {
    EngineSettings::new()
        .with_speaker_setup(SpeakerSetup::Mono)
        .with_frames_per_buffer(frames)
}

/// 一个 tick：生产者混一块，硬件取走一块
fn tick(engine: &mut SfxEngine, consumer: &mut OutputConsumer) -> Vec<f32> {
    engine.update();
    let mut out = vec![0.0; consumer.block_len()];
    assert_eq!(consumer.render(&mut out), CallbackStatus::Continue);
    out
}

#[test]
fn looped_sound_wraps_across_blocks() {
    let (mut engine, mut consumer) = SfxEngine::new(&mono(3)).unwrap();
    let h = engine.make_sound(&[1.0, 2.0, 3.0, 4.0], 1, true).unwrap();
    engine.set_looping(h, true).unwrap();
    engine.play(h).unwrap();

    assert_eq!(tick(&mut engine, &mut consumer), vec![1.0, 2.0, 3.0]);
    assert_eq!(engine.get_position(h).unwrap(), Some(3));

    assert_eq!(tick(&mut engine, &mut consumer), vec![4.0, 1.0, 2.0]);
    assert_eq!(engine.get_position(h).unwrap(), Some(2));

    assert_eq!(tick(&mut engine, &mut consumer), vec![3.0, 4.0, 1.0]);
    assert!(engine.is_playing(h).unwrap());
}

#[test]
fn one_shot_plays_once_then_goes_silent() {
    let (mut engine, mut consumer) = SfxEngine::new(&mono(4)).unwrap();
    let samples: Vec<f32> = (1..=6).map(|x| x as f32 / 10.0).collect();
    let h = engine.make_sound(&samples, 1, true).unwrap();
    engine.set_looping(h, true).unwrap();
    engine.play_one_shot(h).unwrap();

    assert_eq!(tick(&mut engine, &mut consumer), samples[..4].to_vec());
    assert_eq!(tick(&mut engine, &mut consumer), vec![0.5, 0.6, 0.0, 0.0]);
    assert!(!engine.is_playing(h).unwrap());
    assert_eq!(tick(&mut engine, &mut consumer), vec![0.0; 4]);
}

#[test]
fn concurrent_sounds_are_mixed_and_clamped() {
    let (mut engine, mut consumer) = SfxEngine::new(&mono(4)).unwrap();
    let a = engine.make_sound(&[0.6; 8], 1, true).unwrap();
    let b = engine.make_sound(&[0.6; 8], 1, true).unwrap();
    let c = engine.make_sound(&[-0.6; 8], 1, true).unwrap();

    engine.play(a).unwrap();
    engine.play(b).unwrap();
    assert_eq!(tick(&mut engine, &mut consumer), vec![1.0; 4]);

    engine.stop(b).unwrap();
    engine.play(c).unwrap();
    assert_eq!(tick(&mut engine, &mut consumer), vec![0.0; 4]);
}

#[test]
fn paused_sound_keeps_its_place() {
    let (mut engine, mut consumer) = SfxEngine::new(&mono(2)).unwrap();
    let h = engine.make_sound(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 1, true).unwrap();
    engine.play(h).unwrap();
    tick(&mut engine, &mut consumer);

    engine.pause(h).unwrap();
    assert!(engine.is_paused(h).unwrap());
    for _ in 0..3 {
        assert_eq!(tick(&mut engine, &mut consumer), vec![0.0, 0.0]);
    }
    assert_eq!(engine.get_position(h).unwrap(), Some(2));

    engine.unpause(h).unwrap();
    assert!(!engine.is_paused(h).unwrap());
    assert_eq!(tick(&mut engine, &mut consumer), vec![0.3, 0.4]);
}

#[test]
fn dual_mono_output_is_interleaved() {
    let settings = EngineSettings::new()
        .with_speaker_setup(SpeakerSetup::DualMono)
        .with_frames_per_buffer(2);
    let (mut engine, mut consumer) = SfxEngine::new(&settings).unwrap();
    let h = engine.make_sound(&[0.25, -0.25, 0.5, -0.5], 2, true).unwrap();
    engine.play(h).unwrap();

    // 立体声源只保留左声道 [0.25, 0.5]
    assert_eq!(tick(&mut engine, &mut consumer), vec![0.25, 0.25, 0.5, 0.5]);
}

#[test]
fn seeking_respects_sound_length() {
    let (mut engine, _consumer) = SfxEngine::new(&mono(2)).unwrap();
    let h = engine.make_sound(&[0.0; 5], 1, true).unwrap();
    assert!(matches!(engine.go_to_frame(h, 5), Err(SfxError::OutOfRange { frame: 5, len: 5 })));
    engine.go_to_frame(h, 4).unwrap();
    assert_eq!(engine.get_position(h).unwrap(), Some(4));
}

#[test]
fn consumer_replays_stale_block() {
    let (mut engine, mut consumer) = SfxEngine::new(&mono(2)).unwrap();
    let h = engine.make_sound(&[0.1, 0.2, 0.3, 0.4], 1, true).unwrap();
    engine.play(h).unwrap();
    engine.update();

    let mut first = [0.0; 2];
    let mut second = [0.0; 2];
    consumer.render(&mut first);
    consumer.render(&mut second);
    assert_eq!(first, [0.1, 0.2]);
    assert_eq!(first, second);
}

#[test]
fn unknown_handle_is_an_error() {
    let (mut engine, _consumer) = SfxEngine::new(&mono(2)).unwrap();
    assert!(matches!(engine.play(SfxHandle(3)), Err(SfxError::InvalidHandle(SfxHandle(3)))));
    assert!(matches!(engine.make_sound(&[0.1], 0, true), Err(SfxError::InvalidInput(_))));
}

#[test]
fn manager_runs_on_null_backend() {
    let (backend, tap) = null::Player::new();
    let mut manager = SfxManager::with_backend(&mono(2), Box::new(backend)).unwrap();
    assert!(tap.is_running());
    assert_eq!(tap.open_count(), 1);

    let h = manager.make_sound(&[0.5, 0.25], 1, true).unwrap();
    manager.play_one_shot(h).unwrap();
    manager.update();

    let mut out = [0.0; 2];
    assert_eq!(tap.pull(&mut out), Some(CallbackStatus::Continue));
    assert_eq!(out, [0.5, 0.25]);
    assert_eq!(manager.get_buffer_latency(), manager.engine().get_buffer_latency());

    drop(manager);
    assert!(!tap.is_running());
    assert_eq!(tap.pull(&mut out), None);
}

#[test]
fn manager_rebuilds_lost_stream() {
    let (backend, tap) = null::Player::new();
    let mut manager = SfxManager::with_backend(&mono(2), Box::new(backend)).unwrap();
    let h = manager.make_sound(&[0.5; 8], 1, true).unwrap();
    manager.play(h).unwrap();
    manager.update();

    // 健康的流不会被重建
    manager.maintain_stream();
    assert_eq!(tap.open_count(), 1);

    tap.fail();
    manager.maintain_stream();
    assert_eq!(tap.open_count(), 2);
    assert!(tap.is_running());

    // 新通道从 dirty 开始，播放继续
    assert!(manager.is_dirty());
    manager.update();
    let mut out = [0.0; 2];
    tap.pull(&mut out);
    assert_eq!(out, [0.5, 0.5]);
    assert!(manager.is_playing(h).unwrap());
}

#[test]
fn unsupported_settings_fail_construction() {
    let (backend, tap) = null::Player::new();
    let settings = EngineSettings::new().with_speaker_setup(SpeakerSetup::Stereo);
    let err = SfxManager::with_backend(&settings, Box::new(backend)).err().unwrap();
    assert!(matches!(err, SfxError::UnsupportedConfiguration(_)));
    assert_eq!(tap.open_count(), 0);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn oversized_block_fails_construction_instead_of_panicking() {
    let (backend, tap) = null::Player::new();
    let settings = EngineSettings::new().with_frames_per_buffer(usize::MAX / 2 + 1);
    let err = SfxManager::with_backend(&settings, Box::new(backend)).err().unwrap();
    assert!(matches!(err, SfxError::UnsupportedConfiguration(_)));
    assert_eq!(tap.open_count(), 0);

    let settings = EngineSettings::new().with_frames_per_buffer((1 << 32) + 4);
    assert!(matches!(SfxEngine::new(&settings), Err(SfxError::UnsupportedConfiguration(_))));
}
