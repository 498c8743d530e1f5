// src/types.rs
use crate::signal::TickReport;

// 宿主发给扫描线程的命令
#[derive(Clone, Debug)]
pub enum ScanCommand {
    Start,
    Stop,
    SetInterval(f64),
    SetPeriod(f64),
    SetContinuous(bool),
    AddChannel(String),
    RemoveChannel(String),
    SetNormalized(bool),
    SetLogarithmic(bool),
    SetMin(f64),
    SetMax(f64),
    SetAutoMin(bool),
    SetAutoMax(bool),
    Shutdown,
}

// 扫描线程发回宿主的消息
#[derive(Clone, Debug)]
pub enum ScanMessage {
    Status(bool),     // 是否正在扫描
    Tick(TickReport), // 每个采样点
    Range(f64, f64),  // 纵轴范围 (重新配置之后)
    Overrun(u64),     // 采样超时, 丢弃的定时触发次数
    Error(String),
}
