/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : no_grad 上下文
 *
 * 梯度开关是线程局部的。关闭期间：
 * - 各模块的前向传播不缓存反向传播所需的中间值；
 * - `Parameter::accumulate_grad`不累积梯度。
 * 用`NoGradGuard`限定作用域，离开作用域（正常返回、`?`提前返回或panic展开）时恢复原值。
 */

use std::cell::Cell;

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// 当前线程是否开启梯度追踪
pub fn is_grad_enabled() -> bool {
    GRAD_ENABLED.with(Cell::get)
}

/// 在其生命周期内关闭梯度追踪，析构时恢复为创建前的状态
///
/// ```ignore
/// {
///     let _guard = NoGradGuard::new();
///     param.value_mut().copy_from(&new_value)?; // 直接改写参数
/// } // 此处恢复
/// ```
#[must_use = "guard 被立即析构的话，梯度追踪会马上恢复"]
pub struct NoGradGuard {
    previous: bool,
}

impl NoGradGuard {
    pub fn new() -> Self {
        let previous = GRAD_ENABLED.with(|flag| flag.replace(false));
        Self { previous }
    }
}

impl Default for NoGradGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NoGradGuard {
    fn drop(&mut self) {
        GRAD_ENABLED.with(|flag| flag.set(self.previous));
    }
}

/// 在关闭梯度追踪的情况下执行`f`
pub fn no_grad<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = NoGradGuard::new();
    f()
}
