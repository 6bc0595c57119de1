//! Boot-time wiring.
//!
//! Interrupt drivers are placed in caller-provided [`StaticCell`] slots
//! because the interrupt controller keeps a `&'static` reference to the
//! handler. Task drivers are returned by value, with their configuration
//! record moved in, for the caller to spawn:
//!
//! ```ignore
//! static REGISTER: SignalRegister = SignalRegister::new();
//! static TOUCH: StaticCell<TouchSensor> = StaticCell::new();
//!
//! let register = create_signal_register(&REGISTER)?;
//! init_touch(&TOUCH, register, TouchConfig::default(), &mut touch_peripheral)?;
//! let light = init_light_sensor(register, LightSensorConfig::default(), adc)?;
//! spawner.spawn(light_task(light))?;
//! ```

use platform::{AnalogInput, DacOutput, InterruptController, MatrixDisplay, TouchController};
use playback::PcmClip;
use static_cell::StaticCell;

use crate::audio::AudioResponder;
use crate::config::{
    AudioResponderConfig, DisplayResponderConfig, LightSensorConfig, LimitSwitchConfig,
    TouchConfig,
};
use crate::display::DisplayResponder;
use crate::error::InteractError;
use crate::input::{LightSensor, LimitSwitch, TouchSensor};
use crate::signals::SignalRegister;

/// Bring `register` live. Idempotent.
pub fn create_signal_register(
    register: &'static SignalRegister,
) -> Result<&'static SignalRegister, InteractError> {
    register.create()
}

/// Tear `register` down. Must not race active producers or consumers.
pub fn destroy_signal_register(register: &SignalRegister) {
    register.destroy();
}

fn ensure_register(register: &'static SignalRegister) -> Result<&'static SignalRegister, InteractError> {
    register.create().map_err(|_| InteractError::InvalidState)
}

/// Install the touch pad handler.
///
/// # Errors
///
/// `InvalidState` if the register cannot be created, `ResourceExhausted` if
/// `slot` is already taken or the controller refuses the handler.
pub fn init_touch<T: TouchController>(
    slot: &'static StaticCell<TouchSensor>,
    register: &'static SignalRegister,
    config: TouchConfig,
    controller: &mut T,
) -> Result<&'static TouchSensor, InteractError> {
    let register = ensure_register(register)?;
    let sensor: &'static TouchSensor = slot
        .try_init(TouchSensor::new(register, config))
        .ok_or(InteractError::ResourceExhausted)?;
    sensor.install(controller)?;
    Ok(sensor)
}

/// Install the limit switch handler.
///
/// # Errors
///
/// `InvalidConfiguration` for an unsupported trigger (checked first, the
/// slot stays free and nothing is attached), `InvalidState` if the register
/// cannot be created, `ResourceExhausted` if `slot` is already taken or the
/// controller refuses the pin.
pub fn init_limit_switch<C: InterruptController>(
    slot: &'static StaticCell<LimitSwitch>,
    register: &'static SignalRegister,
    config: LimitSwitchConfig,
    controller: &mut C,
) -> Result<&'static LimitSwitch, InteractError> {
    config.validate()?;
    let register = ensure_register(register)?;
    let switch: &'static LimitSwitch = slot
        .try_init(LimitSwitch::new(register, config))
        .ok_or(InteractError::ResourceExhausted)?;
    switch.install(controller)?;
    Ok(switch)
}

/// Build the light poller task.
///
/// # Errors
///
/// `InvalidConfiguration` for a zero period, `InvalidState` if the register
/// cannot be created.
pub fn init_light_sensor<A: AnalogInput>(
    register: &'static SignalRegister,
    config: LightSensorConfig,
    adc: A,
) -> Result<LightSensor<A>, InteractError> {
    config.validate()?;
    let register = ensure_register(register)?;
    Ok(LightSensor::new(register, config, adc))
}

/// Build the audio responder task.
///
/// # Errors
///
/// `InvalidState` if the register cannot be created.
pub fn init_audio_responder<D: DacOutput>(
    register: &'static SignalRegister,
    config: AudioResponderConfig,
    dac: D,
    clip: PcmClip<'static>,
) -> Result<AudioResponder<D>, InteractError> {
    let register = ensure_register(register)?;
    Ok(AudioResponder::new(register, config, dac, clip))
}

/// Build the display responder task.
///
/// # Errors
///
/// `InvalidConfiguration` for a zero scroll period or intensity above 15,
/// `InvalidState` if the register cannot be created.
pub fn init_display_responder<M: MatrixDisplay>(
    register: &'static SignalRegister,
    config: DisplayResponderConfig,
    matrix: M,
) -> Result<DisplayResponder<M>, InteractError> {
    config.validate()?;
    let register = ensure_register(register)?;
    Ok(DisplayResponder::new(register, config, matrix))
}
